//! External video-upload integration boundary.
//!
//! The upload provider holds one shared credential for the whole
//! deployment. It is injected into [`crate::ApiState`] behind this trait so
//! no handler ever touches a concrete token file or SDK type; a deployment
//! without a provider runs against [`DisconnectedVideoUpload`].

use axum::{Json, Router, extract::State, http::StatusCode, routing::{get, post}};
use serde_json::json;
use thiserror::Error;

use crate::{ApiState, auth::AuthUser, error::ApiError};

/// Failures surfaced by the upload provider.
#[derive(Debug, Error)]
pub enum VideoUploadError {
    #[error("no video provider is configured")]
    NotConfigured,
    #[error("video provider error: {0}")]
    Provider(String),
}

/// Injected boundary to the external video host.
pub trait VideoUploadPort: Send + Sync {
    /// Whether the shared provider credential is currently valid.
    fn is_authenticated(&self) -> bool;

    /// Upload a video and return its public URL.
    fn upload(&self, file_name: &str, content: &[u8]) -> Result<String, VideoUploadError>;

    /// Revoke the shared provider credential.
    fn revoke(&self) -> Result<(), VideoUploadError>;
}

/// Default port for deployments without a video provider.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisconnectedVideoUpload;

impl VideoUploadPort for DisconnectedVideoUpload {
    fn is_authenticated(&self) -> bool {
        false
    }

    fn upload(&self, _file_name: &str, _content: &[u8]) -> Result<String, VideoUploadError> {
        Err(VideoUploadError::NotConfigured)
    }

    fn revoke(&self) -> Result<(), VideoUploadError> {
        Err(VideoUploadError::NotConfigured)
    }
}

/// Create the video integration routes
pub fn routes() -> Router<ApiState> {
    Router::new()
        .route("/integrations/video/status", get(video_status))
        .route("/integrations/video/revoke", post(video_revoke))
}

async fn video_status(
    _auth_user: AuthUser,
    State(state): State<ApiState>,
) -> Json<serde_json::Value> {
    Json(json!({ "authenticated": state.video_upload.is_authenticated() }))
}

/// Revoke the shared provider credential. Trainer-only: the credential is
/// deployment-wide, not per-user.
async fn video_revoke(
    auth_user: AuthUser,
    State(state): State<ApiState>,
) -> Result<StatusCode, ApiError> {
    auth_user.require_trainer()?;
    state
        .video_upload
        .revoke()
        .map_err(|e| ApiError::Conflict(e.to_string()))?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disconnected_port_rejects_everything() {
        let port = DisconnectedVideoUpload;
        assert!(!port.is_authenticated());
        assert!(matches!(
            port.upload("intro.mp4", b"bytes"),
            Err(VideoUploadError::NotConfigured)
        ));
        assert!(matches!(port.revoke(), Err(VideoUploadError::NotConfigured)));
    }
}
