use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post, put},
};
use lms_db::{
    models::{Course, CourseStatus, Module},
    repositories::{course as course_repo, enrollment as enrollment_repo},
};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use super::model::{
    ChecklistItemRequest, CourseDetail, CourseRequest, ModuleRequest, ModuleWithItems,
    SetCourseStatusRequest,
};
use crate::{ApiState, auth::AuthUser, error::ApiError, validation};

/// Create the course authoring and catalog routes
pub fn routes() -> Router<ApiState> {
    Router::new()
        .route("/courses", post(create_course))
        .route("/courses", get(list_published))
        .route("/courses/mine", get(list_mine))
        .route("/courses/{course_id}", get(get_course))
        .route("/courses/{course_id}", put(update_course))
        .route("/courses/{course_id}", delete(delete_course))
        .route("/courses/{course_id}/status", put(set_status))
        .route("/courses/{course_id}/modules", post(create_module))
        .route("/modules/{module_id}", put(update_module))
        .route("/modules/{module_id}", delete(delete_module))
        .route(
            "/modules/{module_id}/checklist-items",
            post(create_checklist_item),
        )
        .route(
            "/checklist-items/{item_id}",
            delete(delete_checklist_item),
        )
}

/// Fetch a course and require the caller to be its owner.
pub(crate) async fn require_course_owner(
    pool: &PgPool,
    course_id: Uuid,
    user_id: Uuid,
) -> Result<Course, ApiError> {
    let course = course_repo::fetch_course(pool, course_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Course not found".to_string()))?;
    if course.created_by != user_id {
        return Err(ApiError::Forbidden(
            "You do not own this course".to_string(),
        ));
    }
    Ok(course)
}

/// Fetch a course and require the caller to be able to see it: owner,
/// enrolled learner, or anyone once the course is published.
pub(crate) async fn require_course_access(
    pool: &PgPool,
    course_id: Uuid,
    user_id: Uuid,
) -> Result<Course, ApiError> {
    let course = course_repo::fetch_course(pool, course_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Course not found".to_string()))?;

    if course.status == CourseStatus::Published || course.created_by == user_id {
        return Ok(course);
    }
    let enrolled = enrollment_repo::fetch_enrollment_for_course(pool, user_id, course_id)
        .await?
        .is_some();
    if enrolled {
        return Ok(course);
    }
    // Unpublished courses are invisible rather than forbidden.
    Err(ApiError::NotFound("Course not found".to_string()))
}

/// Fetch a module and require the caller to own its course.
pub(crate) async fn require_module_owner(
    pool: &PgPool,
    module_id: Uuid,
    user_id: Uuid,
) -> Result<Module, ApiError> {
    let module = course_repo::fetch_module(pool, module_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Module not found".to_string()))?;
    require_course_owner(pool, module.course_id, user_id).await?;
    Ok(module)
}

async fn create_course(
    auth_user: AuthUser,
    State(state): State<ApiState>,
    Json(payload): Json<CourseRequest>,
) -> Result<(StatusCode, Json<Course>), ApiError> {
    auth_user.require_trainer()?;
    payload
        .validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    let course = course_repo::insert_course(
        &state.pool,
        &payload.title,
        payload.description.as_deref(),
        payload.category.as_deref(),
        auth_user.user_id,
    )
    .await?;

    tracing::info!(course_id = %course.id, "created course");
    Ok((StatusCode::CREATED, Json(course)))
}

async fn list_published(
    _auth_user: AuthUser,
    State(state): State<ApiState>,
) -> Result<Json<Vec<Course>>, ApiError> {
    let courses = course_repo::list_published_courses(&state.pool).await?;
    Ok(Json(courses))
}

async fn list_mine(
    auth_user: AuthUser,
    State(state): State<ApiState>,
) -> Result<Json<Vec<Course>>, ApiError> {
    auth_user.require_trainer()?;
    let courses = course_repo::list_courses_by_owner(&state.pool, auth_user.user_id).await?;
    Ok(Json(courses))
}

async fn get_course(
    auth_user: AuthUser,
    State(state): State<ApiState>,
    Path(course_id): Path<Uuid>,
) -> Result<Json<CourseDetail>, ApiError> {
    let course = require_course_access(&state.pool, course_id, auth_user.user_id).await?;

    let modules = course_repo::list_modules(&state.pool, course_id).await?;
    let mut detail = Vec::with_capacity(modules.len());
    for module in modules {
        let checklist_items = course_repo::list_checklist_items(&state.pool, module.id).await?;
        detail.push(ModuleWithItems {
            module,
            checklist_items,
        });
    }

    Ok(Json(CourseDetail {
        course,
        modules: detail,
    }))
}

async fn update_course(
    auth_user: AuthUser,
    State(state): State<ApiState>,
    Path(course_id): Path<Uuid>,
    Json(payload): Json<CourseRequest>,
) -> Result<Json<Course>, ApiError> {
    require_course_owner(&state.pool, course_id, auth_user.user_id).await?;
    payload
        .validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    let course = course_repo::update_course(
        &state.pool,
        course_id,
        &payload.title,
        payload.description.as_deref(),
        payload.category.as_deref(),
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Course not found".to_string()))?;

    Ok(Json(course))
}

async fn set_status(
    auth_user: AuthUser,
    State(state): State<ApiState>,
    Path(course_id): Path<Uuid>,
    Json(payload): Json<SetCourseStatusRequest>,
) -> Result<Json<Course>, ApiError> {
    require_course_owner(&state.pool, course_id, auth_user.user_id).await?;

    let course = course_repo::set_course_status(&state.pool, course_id, payload.status)
        .await?
        .ok_or_else(|| ApiError::NotFound("Course not found".to_string()))?;

    tracing::info!(course_id = %course.id, status = ?course.status, "changed course status");
    Ok(Json(course))
}

async fn delete_course(
    auth_user: AuthUser,
    State(state): State<ApiState>,
    Path(course_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    require_course_owner(&state.pool, course_id, auth_user.user_id).await?;

    course_repo::delete_course(&state.pool, course_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn create_module(
    auth_user: AuthUser,
    State(state): State<ApiState>,
    Path(course_id): Path<Uuid>,
    Json(payload): Json<ModuleRequest>,
) -> Result<(StatusCode, Json<Module>), ApiError> {
    require_course_owner(&state.pool, course_id, auth_user.user_id).await?;
    payload
        .validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;
    validation::validate_order_sequence(payload.order_sequence)?;

    let module = course_repo::insert_module(
        &state.pool,
        course_id,
        &payload.title,
        payload.video_url.as_deref(),
        payload.doc_url.as_deref(),
        payload.content_text.as_deref(),
        payload.order_sequence,
    )
    .await
    .map_err(|e| ApiError::conflict_on_unique(e, "a module already occupies this position"))?;

    Ok((StatusCode::CREATED, Json(module)))
}

async fn update_module(
    auth_user: AuthUser,
    State(state): State<ApiState>,
    Path(module_id): Path<Uuid>,
    Json(payload): Json<ModuleRequest>,
) -> Result<Json<Module>, ApiError> {
    require_module_owner(&state.pool, module_id, auth_user.user_id).await?;
    payload
        .validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;
    validation::validate_order_sequence(payload.order_sequence)?;

    let module = course_repo::update_module(
        &state.pool,
        module_id,
        &payload.title,
        payload.video_url.as_deref(),
        payload.doc_url.as_deref(),
        payload.content_text.as_deref(),
        payload.order_sequence,
    )
    .await
    .map_err(|e| ApiError::conflict_on_unique(e, "a module already occupies this position"))?
    .ok_or_else(|| ApiError::NotFound("Module not found".to_string()))?;

    Ok(Json(module))
}

async fn delete_module(
    auth_user: AuthUser,
    State(state): State<ApiState>,
    Path(module_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    require_module_owner(&state.pool, module_id, auth_user.user_id).await?;

    course_repo::delete_module(&state.pool, module_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn create_checklist_item(
    auth_user: AuthUser,
    State(state): State<ApiState>,
    Path(module_id): Path<Uuid>,
    Json(payload): Json<ChecklistItemRequest>,
) -> Result<(StatusCode, Json<lms_db::models::ChecklistItem>), ApiError> {
    require_module_owner(&state.pool, module_id, auth_user.user_id).await?;
    payload
        .validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;
    validation::validate_order_sequence(payload.order_sequence)?;

    let item = course_repo::insert_checklist_item(
        &state.pool,
        module_id,
        &payload.title,
        payload.kind,
        payload.order_sequence,
        payload.xp_reward,
    )
    .await
    .map_err(|e| {
        ApiError::conflict_on_unique(e, "a checklist item already occupies this position")
    })?;

    Ok((StatusCode::CREATED, Json(item)))
}

async fn delete_checklist_item(
    auth_user: AuthUser,
    State(state): State<ApiState>,
    Path(item_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let item = course_repo::fetch_checklist_item(&state.pool, item_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Checklist item not found".to_string()))?;
    require_module_owner(&state.pool, item.module_id, auth_user.user_id).await?;

    course_repo::delete_checklist_item(&state.pool, item_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
