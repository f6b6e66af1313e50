//! Unified error handling with Sentry integration.
//!
//! Pages show most failures inline. `AppError` covers what is left: a handler
//! that cannot render at all returns it and the error is reported here.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use thiserror::Error;

use crate::api::ApiError;
use crate::services::QualityCheckError;

#[derive(Debug, Error)]
pub enum AppError {
    /// Pasarku backend call failed.
    #[error("Backend error: {0}")]
    Api(#[from] ApiError),

    /// Quality prediction service failed.
    #[error("Quality check error: {0}")]
    Quality(#[from] QualityCheckError),

    /// Session store failed.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Logged in but not allowed (e.g. another merchant's dashboard).
    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Rate limited")]
    RateLimited,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    const fn is_server_error(&self) -> bool {
        match self {
            Self::Api(e) => e.is_server_error(),
            Self::Quality(e) => e.is_server_error(),
            Self::Session(_) | Self::Internal(_) => true,
            _ => false,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        // An expired or revoked token sends the user back to the login form.
        if matches!(self, Self::Api(ApiError::Unauthorized)) {
            return Redirect::to("/auth/login?error=Sesi+berakhir,+silakan+login+kembali")
                .into_response();
        }

        let status = match &self {
            Self::Api(ApiError::NotFound(_)) | Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Api(_) => StatusCode::BAD_GATEWAY,
            Self::Quality(e) if e.is_server_error() => StatusCode::BAD_GATEWAY,
            Self::Quality(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Session(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
        };

        // Internal details stay in the logs.
        let message = match &self {
            Self::Api(ApiError::NotFound(_)) | Self::NotFound(_) => {
                "Halaman tidak ditemukan".to_string()
            }
            Self::Api(e) => e.user_message(),
            Self::Quality(e) if e.is_server_error() => {
                "Layanan cek kualitas tidak tersedia".to_string()
            }
            Self::Quality(e) => e.to_string(),
            Self::Session(_) | Self::Internal(_) => "Terjadi kesalahan pada server".to_string(),
            Self::Unauthorized(_) => "Silakan login terlebih dahulu".to_string(),
            Self::Forbidden(_) => "Akses ditolak".to_string(),
            Self::BadRequest(msg) => msg.clone(),
            Self::RateLimited => "Terlalu banyak percobaan, coba lagi nanti".to_string(),
        };

        (status, message).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

/// Associate subsequent Sentry events with a user.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Stop associating Sentry events with the user (logout).
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Record a user action as a Sentry breadcrumb.
pub fn add_breadcrumb(category: &str, message: &str, data: &[(&str, &str)]) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };
    for (key, value) in data {
        breadcrumb.data.insert(
            (*key).to_string(),
            serde_json::Value::String((*value).to_string()),
        );
    }
    sentry::add_breadcrumb(breadcrumb);
}
