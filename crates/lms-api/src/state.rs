use std::sync::Arc;

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use sqlx::PgPool;

use crate::{
    config::{ApiConfig, Environment},
    upload::{DisconnectedVideoUpload, VideoUploadPort},
};

/// Settings the auth extractor needs, split out so it can be pulled from
/// the state via `FromRef` without dragging the pool along.
#[derive(Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub jwt_expiry_hours: i64,
    pub bcrypt_cost: u32,
}

#[derive(Clone)]
pub struct ApiState {
    pub pool: PgPool,
    pub auth: AuthConfig,
    pub cookie_key: Key,
    pub environment: Environment,
    pub frontend_url: String,
    pub video_upload: Arc<dyn VideoUploadPort>,
}

impl ApiState {
    pub fn new(config: ApiConfig, pool: PgPool) -> Self {
        let cookie_key = Key::from(config.cookie_secret.as_bytes());

        Self {
            pool,
            auth: AuthConfig {
                jwt_secret: config.jwt_secret,
                jwt_expiry_hours: 24,
                bcrypt_cost: config.bcrypt_cost,
            },
            cookie_key,
            environment: config.env,
            frontend_url: config.frontend_url,
            video_upload: Arc::new(DisconnectedVideoUpload),
        }
    }

    /// Swap in a concrete video-upload provider.
    pub fn with_video_upload(mut self, port: Arc<dyn VideoUploadPort>) -> Self {
        self.video_upload = port;
        self
    }
}

impl FromRef<ApiState> for Key {
    fn from_ref(state: &ApiState) -> Self {
        state.cookie_key.clone()
    }
}

impl FromRef<ApiState> for AuthConfig {
    fn from_ref(state: &ApiState) -> Self {
        state.auth.clone()
    }
}
