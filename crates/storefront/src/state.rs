//! Application state shared across handlers.

use std::sync::Arc;

use crate::api::{ApiError, PasarkuClient};
use crate::config::StorefrontConfig;
use crate::services::{QualityCheckError, QualityClient};

/// Error building the shared clients.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("backend client: {0}")]
    Api(#[from] ApiError),
    #[error("quality check client: {0}")]
    Quality(#[from] QualityCheckError),
}

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`. Holds no per-user data: the token travels in
/// each request's session.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    api: PasarkuClient,
    quality: QualityClient,
}

impl AppState {
    /// # Errors
    ///
    /// Returns an error if an HTTP client cannot be built.
    pub fn new(config: StorefrontConfig) -> Result<Self, StateError> {
        let api = PasarkuClient::new(&config.api)?;
        let quality = QualityClient::new(
            config.quality_check_url.clone(),
            config.api.request_timeout,
        )?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                api,
                quality,
            }),
        })
    }

    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Pasarku backend client.
    #[must_use]
    pub fn api(&self) -> &PasarkuClient {
        &self.inner.api
    }

    /// Produce quality prediction client.
    #[must_use]
    pub fn quality(&self) -> &QualityClient {
        &self.inner.quality
    }
}
