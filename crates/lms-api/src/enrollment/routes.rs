use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post},
};
use lms_db::{
    models::{CourseStatus, Enrollment},
    repositories::{course as course_repo, enrollment as enrollment_repo},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{ApiState, auth::AuthUser, error::ApiError};

/// Create the enrollment routes
pub fn routes() -> Router<ApiState> {
    Router::new()
        .route("/enrollments", post(enroll))
        .route("/enrollments", get(list_enrollments))
        .route("/enrollments/{course_id}", delete(unenroll))
}

#[derive(Debug, Deserialize)]
struct EnrollRequest {
    course_id: Uuid,
}

async fn enroll(
    auth_user: AuthUser,
    State(state): State<ApiState>,
    Json(payload): Json<EnrollRequest>,
) -> Result<(StatusCode, Json<Enrollment>), ApiError> {
    let course = course_repo::fetch_course(&state.pool, payload.course_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Course not found".to_string()))?;

    // Drafts and archived courses are not open for enrollment; they stay
    // invisible to learners rather than reporting a different failure.
    if course.status != CourseStatus::Published {
        return Err(ApiError::NotFound("Course not found".to_string()));
    }

    let enrollment = enrollment_repo::insert_enrollment(&state.pool, auth_user.user_id, course.id)
        .await
        .map_err(|e| ApiError::conflict_on_unique(e, "already enrolled in this course"))?;

    tracing::info!(enrollment_id = %enrollment.id, course_id = %course.id, "enrolled user");
    Ok((StatusCode::CREATED, Json(enrollment)))
}

async fn list_enrollments(
    auth_user: AuthUser,
    State(state): State<ApiState>,
) -> Result<Json<Vec<Enrollment>>, ApiError> {
    let enrollments =
        enrollment_repo::list_enrollments_for_user(&state.pool, auth_user.user_id).await?;
    Ok(Json(enrollments))
}

async fn unenroll(
    auth_user: AuthUser,
    State(state): State<ApiState>,
    Path(course_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let removed =
        enrollment_repo::delete_enrollment(&state.pool, auth_user.user_id, course_id).await?;
    if !removed {
        return Err(ApiError::NotFound(
            "You are not enrolled in this course".to_string(),
        ));
    }
    Ok(StatusCode::NO_CONTENT)
}
