use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Cookie};
use lms_db::{models::UserRole, repositories::user as user_repo};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::{jwt, middleware::AuthUser};
use crate::{ApiState, error::ApiError};

pub fn routes() -> Router<ApiState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/me", get(auth_me))
        .route("/auth/logout", get(logout))
}

#[derive(Debug, Deserialize, Validate)]
struct RegisterRequest {
    #[validate(length(min = 3, max = 50, message = "username must be 3-50 characters"))]
    username: String,
    #[validate(email(message = "invalid email address"))]
    email: String,
    #[validate(length(min = 8, message = "password must be at least 8 characters"))]
    password: String,
    role: Option<UserRole>,
}

#[derive(Debug, Deserialize, Validate)]
struct LoginRequest {
    #[validate(email(message = "invalid email address"))]
    email: String,
    password: String,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub role: UserRole,
}

async fn register(
    State(state): State<ApiState>,
    jar: PrivateCookieJar,
    Json(payload): Json<RegisterRequest>,
) -> Result<(PrivateCookieJar, (StatusCode, Json<UserResponse>)), ApiError> {
    payload
        .validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    let password_hash = bcrypt::hash(&payload.password, state.auth.bcrypt_cost)
        .map_err(|e| ApiError::Validation(format!("could not hash password: {e}")))?;

    let role = payload.role.unwrap_or(UserRole::Learner);
    let user = user_repo::insert_user(
        &state.pool,
        &payload.username,
        &payload.email,
        &password_hash,
        role,
    )
    .await
    .map_err(|e| ApiError::conflict_on_unique(e, "email is already registered"))?;

    let token = jwt::generate_jwt_token(
        user.id,
        user.email.clone(),
        user.role,
        &state.auth.jwt_secret,
        state.auth.jwt_expiry_hours,
    )?;
    let cookie = jwt::create_auth_cookie(token, &state.environment, state.auth.jwt_expiry_hours);

    tracing::info!(user_id = %user.id, "registered new user");

    Ok((
        jar.add(cookie),
        (
            StatusCode::CREATED,
            Json(UserResponse {
                id: user.id,
                username: user.username,
                email: user.email,
                role: user.role,
            }),
        ),
    ))
}

async fn login(
    State(state): State<ApiState>,
    jar: PrivateCookieJar,
    Json(payload): Json<LoginRequest>,
) -> Result<(PrivateCookieJar, Json<UserResponse>), ApiError> {
    payload
        .validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    let user = user_repo::fetch_user_by_email(&state.pool, &payload.email)
        .await?
        .ok_or_else(|| ApiError::Auth("Invalid email or password".to_string()))?;

    let password_ok = bcrypt::verify(&payload.password, &user.password_hash)
        .map_err(|_| ApiError::Auth("Invalid email or password".to_string()))?;
    if !password_ok {
        return Err(ApiError::Auth("Invalid email or password".to_string()));
    }

    let token = jwt::generate_jwt_token(
        user.id,
        user.email.clone(),
        user.role,
        &state.auth.jwt_secret,
        state.auth.jwt_expiry_hours,
    )?;
    let cookie = jwt::create_auth_cookie(token, &state.environment, state.auth.jwt_expiry_hours);

    Ok((
        jar.add(cookie),
        Json(UserResponse {
            id: user.id,
            username: user.username,
            email: user.email,
            role: user.role,
        }),
    ))
}

async fn auth_me(
    auth_user: AuthUser,
    State(state): State<ApiState>,
) -> Result<Json<UserResponse>, ApiError> {
    // Fetch full user details in case the token claims are stale
    let user = user_repo::fetch_user(&state.pool, auth_user.user_id)
        .await?
        .ok_or_else(|| ApiError::Auth("User not found".to_string()))?;

    Ok(Json(UserResponse {
        id: user.id,
        username: user.username,
        email: user.email,
        role: user.role,
    }))
}

async fn logout(jar: PrivateCookieJar) -> (PrivateCookieJar, Json<serde_json::Value>) {
    let auth_cookie = Cookie::build(("auth_token", "")).path("/").build();
    let jar = jar.remove(auth_cookie);

    (
        jar,
        Json(serde_json::json!({ "message": "Logged out successfully" })),
    )
}
