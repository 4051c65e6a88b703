use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::CookieJar;
use serde::Serialize;
use tracing::error;

use crate::auth::cookie::clear_session_cookies;

/// Every failure a handler can report. Infrastructure variants keep the
/// underlying error for logging; only a terse message reaches the client.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    ValidationFailed(String),

    #[error("{0}")]
    AuthFailed(String),

    #[error("Session is no longer valid, please log in again")]
    ForceLogout,

    #[error("No face detected in the submitted image")]
    NoFaceDetected,

    #[error("User store unavailable")]
    StoreUnavailable(#[source] anyhow::Error),

    #[error("Face embedding inference failed")]
    InferenceFailed(#[source] anyhow::Error),

    #[error("Internal server error")]
    Internal(#[source] anyhow::Error),
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub status: bool,
    pub message: String,
    pub code: &'static str,
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationFailed(_) => StatusCode::BAD_REQUEST,
            AppError::AuthFailed(_) | AppError::ForceLogout => StatusCode::UNAUTHORIZED,
            AppError::NoFaceDetected => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::InferenceFailed(_) => StatusCode::BAD_GATEWAY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::ValidationFailed(_) => "VALIDATION_FAILED",
            AppError::AuthFailed(_) => "AUTH_FAILED",
            AppError::ForceLogout => "SESSION_INVALID",
            AppError::NoFaceDetected => "NO_FACE_DETECTED",
            AppError::StoreUnavailable(_) => "STORE_UNAVAILABLE",
            AppError::InferenceFailed(_) => "INFERENCE_FAILED",
            AppError::Internal(_) => "INTERNAL",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::StoreUnavailable(e) | AppError::InferenceFailed(e) | AppError::Internal(e) => {
                error!(error = %format!("{e:#}"), code = self.code(), "request failed");
            }
            _ => {}
        }

        let status = self.status_code();
        let body = Json(ErrorBody {
            status: false,
            message: self.to_string(),
            code: self.code(),
        });

        if matches!(self, AppError::ForceLogout) {
            let jar = clear_session_cookies(CookieJar::new());
            return (status, jar, body).into_response();
        }
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infrastructure_errors_hide_details() {
        let err = AppError::StoreUnavailable(anyhow::anyhow!("connection refused on 10.0.0.3"));
        assert_eq!(err.to_string(), "User store unavailable");
        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn force_logout_clears_cookies() {
        let res = AppError::ForceLogout.into_response();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        let cleared: Vec<_> = res
            .headers()
            .get_all(axum::http::header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .collect();
        assert!(cleared.iter().any(|c| c.starts_with("access_token=")));
        assert!(cleared.iter().any(|c| c.starts_with("enrollment_token=")));
    }

    #[test]
    fn no_face_is_distinct_from_inference_failure() {
        assert_eq!(AppError::NoFaceDetected.code(), "NO_FACE_DETECTED");
        assert_ne!(
            AppError::NoFaceDetected.status_code(),
            AppError::InferenceFailed(anyhow::anyhow!("timeout")).status_code()
        );
    }
}
