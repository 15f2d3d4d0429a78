use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, put},
};
use lms_db::{
    models::CourseRating,
    repositories::{course as course_repo, enrollment as enrollment_repo, rating as rating_repo},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{ApiState, auth::AuthUser, error::ApiError, validation};

/// Create the course rating routes
pub fn routes() -> Router<ApiState> {
    Router::new()
        .route("/courses/{course_id}/rating", put(rate_course))
        .route("/courses/{course_id}/ratings", get(list_ratings))
}

#[derive(Debug, Deserialize)]
struct RateCourseRequest {
    rating: i32,
    review: Option<String>,
}

/// Upsert the caller's rating for a course. Enrollment-gated; a second call
/// overwrites the previous rating.
async fn rate_course(
    auth_user: AuthUser,
    State(state): State<ApiState>,
    Path(course_id): Path<Uuid>,
    Json(payload): Json<RateCourseRequest>,
) -> Result<Json<CourseRating>, ApiError> {
    validation::validate_rating(payload.rating)?;

    let course = course_repo::fetch_course(&state.pool, course_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Course not found".to_string()))?;

    let enrolled =
        enrollment_repo::fetch_enrollment_for_course(&state.pool, auth_user.user_id, course.id)
            .await?
            .is_some();
    if !enrolled {
        return Err(ApiError::Forbidden(
            "You must be enrolled to rate this course".to_string(),
        ));
    }

    let rating = rating_repo::upsert_rating(
        &state.pool,
        course.id,
        auth_user.user_id,
        payload.rating,
        payload.review.as_deref(),
    )
    .await?;

    Ok(Json(rating))
}

async fn list_ratings(
    _auth_user: AuthUser,
    State(state): State<ApiState>,
    Path(course_id): Path<Uuid>,
) -> Result<Json<Vec<CourseRating>>, ApiError> {
    let course = course_repo::fetch_course(&state.pool, course_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Course not found".to_string()))?;

    let ratings = rating_repo::list_ratings_for_course(&state.pool, course.id).await?;
    Ok(Json(ratings))
}
