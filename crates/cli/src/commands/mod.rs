//! CLI subcommands.

pub mod auth;
pub mod catalog;
pub mod orders;

use pasarku_storefront::api::PasarkuClient;
use pasarku_storefront::config::PasarkuApiConfig;
use thiserror::Error;

/// Errors building the backend client.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Config(#[from] pasarku_storefront::config::ConfigError),
    #[error(transparent)]
    Api(#[from] pasarku_storefront::api::ApiError),
}

/// Backend client configured from the environment.
///
/// # Errors
///
/// Returns an error if `PASARKU_API_URL` is invalid or the client cannot be built.
pub fn client() -> Result<PasarkuClient, ClientError> {
    let config = PasarkuApiConfig::from_env()?;
    tracing::debug!(api = %config.base_url, "Using Pasarku backend");
    Ok(PasarkuClient::new(&config)?)
}
