use axum::{
    Json, Router,
    extract::{Path, State},
    routing::post,
};
use lms_core::{EmptyCourseRule, legacy_quiz_passed};
use lms_db::{
    models::{ChecklistItem, ChecklistItemKind, Enrollment, EnrollmentStatus},
    repositories::{course as course_repo, enrollment as enrollment_repo, progress as progress_repo},
};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::service;
use crate::{ApiState, auth::AuthUser, error::ApiError, validation};

/// Create the learner progress routes
pub fn routes() -> Router<ApiState> {
    Router::new()
        .route("/progress/modules/{module_id}/text", post(mark_text_read))
        .route(
            "/progress/modules/{module_id}/video",
            post(mark_video_watched),
        )
        .route(
            "/progress/checklist/{item_id}/complete",
            post(complete_checklist_item),
        )
        .route(
            "/progress/checklist/{item_id}/quiz",
            post(record_checklist_quiz),
        )
}

#[derive(Debug, Serialize)]
struct ProgressResponse {
    enrollment_id: Uuid,
    course_id: Uuid,
    progress_percentage: f64,
    status: EnrollmentStatus,
}

impl From<Enrollment> for ProgressResponse {
    fn from(enrollment: Enrollment) -> Self {
        Self {
            enrollment_id: enrollment.id,
            course_id: enrollment.course_id,
            progress_percentage: enrollment.progress_percentage,
            status: enrollment.status,
        }
    }
}

#[derive(Debug, Serialize)]
struct LegacyQuizResponse {
    is_passed: bool,
    score: f64,
    #[serde(flatten)]
    progress: ProgressResponse,
}

#[derive(Debug, Deserialize)]
struct LegacyQuizRequest {
    score: f64,
}

/// The enrollment of the acting user for the given course, or Forbidden.
async fn require_enrollment(
    pool: &PgPool,
    user_id: Uuid,
    course_id: Uuid,
) -> Result<Enrollment, ApiError> {
    enrollment_repo::fetch_enrollment_for_course(pool, user_id, course_id)
        .await?
        .ok_or_else(|| ApiError::Forbidden("You are not enrolled in this course".to_string()))
}

/// A checklist item together with its module's course.
async fn fetch_item_context(
    pool: &PgPool,
    item_id: Uuid,
) -> Result<(ChecklistItem, Uuid), ApiError> {
    let item = course_repo::fetch_checklist_item(pool, item_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Checklist item not found".to_string()))?;
    let module = course_repo::fetch_module(pool, item.module_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Module not found".to_string()))?;
    Ok((item, module.course_id))
}

async fn mark_text_read(
    auth_user: AuthUser,
    State(state): State<ApiState>,
    Path(module_id): Path<Uuid>,
) -> Result<Json<ProgressResponse>, ApiError> {
    let module = course_repo::fetch_module(&state.pool, module_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Module not found".to_string()))?;
    let enrollment = require_enrollment(&state.pool, auth_user.user_id, module.course_id).await?;

    let mut tx = state.pool.begin().await?;
    progress_repo::mark_text_read(&mut *tx, enrollment.id, module.id).await?;
    service::recompute(&mut tx, &enrollment, EmptyCourseRule::FullyComplete).await?;
    let updated = enrollment_repo::fetch_enrollment(&mut *tx, enrollment.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Enrollment not found".to_string()))?;
    tx.commit().await?;

    Ok(Json(updated.into()))
}

async fn mark_video_watched(
    auth_user: AuthUser,
    State(state): State<ApiState>,
    Path(module_id): Path<Uuid>,
) -> Result<Json<ProgressResponse>, ApiError> {
    let module = course_repo::fetch_module(&state.pool, module_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Module not found".to_string()))?;
    let enrollment = require_enrollment(&state.pool, auth_user.user_id, module.course_id).await?;

    let mut tx = state.pool.begin().await?;
    progress_repo::mark_video_watched(&mut *tx, enrollment.id, module.id).await?;
    service::recompute(&mut tx, &enrollment, EmptyCourseRule::FullyComplete).await?;
    let updated = enrollment_repo::fetch_enrollment(&mut *tx, enrollment.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Enrollment not found".to_string()))?;
    tx.commit().await?;

    Ok(Json(updated.into()))
}

async fn complete_checklist_item(
    auth_user: AuthUser,
    State(state): State<ApiState>,
    Path(item_id): Path<Uuid>,
) -> Result<Json<ProgressResponse>, ApiError> {
    let (item, course_id) = fetch_item_context(&state.pool, item_id).await?;
    let enrollment = require_enrollment(&state.pool, auth_user.user_id, course_id).await?;

    let mut tx = state.pool.begin().await?;
    progress_repo::mark_checklist_item_completed(&mut *tx, enrollment.id, item.module_id, item.id)
        .await?;
    service::recompute(&mut tx, &enrollment, EmptyCourseRule::ZeroPercent).await?;
    let updated = enrollment_repo::fetch_enrollment(&mut *tx, enrollment.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Enrollment not found".to_string()))?;
    tx.commit().await?;

    Ok(Json(updated.into()))
}

/// Legacy checklist quiz completion: the caller reports an explicit score
/// and the fixed 70% threshold decides the pass, independent of any quiz's
/// own configurable passing score.
async fn record_checklist_quiz(
    auth_user: AuthUser,
    State(state): State<ApiState>,
    Path(item_id): Path<Uuid>,
    Json(payload): Json<LegacyQuizRequest>,
) -> Result<Json<LegacyQuizResponse>, ApiError> {
    validation::validate_percentage("score", payload.score)?;

    let (item, course_id) = fetch_item_context(&state.pool, item_id).await?;
    if item.kind != ChecklistItemKind::Quiz {
        return Err(ApiError::Validation(
            "Checklist item is not a quiz".to_string(),
        ));
    }
    let enrollment = require_enrollment(&state.pool, auth_user.user_id, course_id).await?;

    let is_passed = legacy_quiz_passed(payload.score);

    let mut tx = state.pool.begin().await?;
    progress_repo::record_checklist_quiz_score(
        &mut *tx,
        enrollment.id,
        item.module_id,
        item.id,
        payload.score,
        is_passed,
    )
    .await?;
    service::recompute(&mut tx, &enrollment, EmptyCourseRule::ZeroPercent).await?;
    let updated = enrollment_repo::fetch_enrollment(&mut *tx, enrollment.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Enrollment not found".to_string()))?;
    tx.commit().await?;

    Ok(Json(LegacyQuizResponse {
        is_passed,
        score: payload.score,
        progress: updated.into(),
    }))
}
