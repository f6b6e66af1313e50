//! Produce quality check client.
//!
//! Forwards a product photo to the prediction service, which classifies it
//! as fit (`layak`) or unfit for sale.

use std::time::Duration;

use reqwest::multipart::{Form, Part};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use thiserror::Error;
use tracing::instrument;
use url::Url;

use crate::api::Upload;

/// Largest accepted image.
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// Image types the prediction service understands.
pub const ACCEPTED_TYPES: [&str; 3] = ["image/jpeg", "image/png", "image/webp"];

/// Label the service uses for sellable produce.
const FIT_LABEL: &str = "layak";

#[derive(Debug, Error)]
pub enum QualityCheckError {
    #[error("Silakan pilih gambar terlebih dahulu")]
    Empty,
    #[error("Format gambar harus JPG, PNG, atau WEBP")]
    UnsupportedType(String),
    #[error("Ukuran gambar maksimal 5 MB")]
    TooLarge(usize),
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{message}")]
    Service { status: u16, message: String },
}

impl QualityCheckError {
    /// Whether the service (rather than the upload) is at fault.
    #[must_use]
    pub const fn is_server_error(&self) -> bool {
        matches!(self, Self::Http(_) | Self::Service { .. })
    }
}

/// Prediction returned by the service.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct QualityReport {
    pub label: String,
    #[serde(default)]
    pub confidence: f64,
    #[serde(default, alias = "category")]
    pub details: Option<String>,
}

impl QualityReport {
    #[must_use]
    pub fn is_fit(&self) -> bool {
        self.label.eq_ignore_ascii_case(FIT_LABEL)
    }

    /// Confidence as a percentage with two decimals, e.g. `93.50%`.
    #[must_use]
    pub fn confidence_percent(&self) -> String {
        format!("{:.2}%", self.confidence * 100.0)
    }
}

/// Check an upload before it is sent anywhere.
///
/// # Errors
///
/// Fails on an empty file, an unsupported content type or a file over
/// [`MAX_IMAGE_BYTES`].
pub fn validate_image(upload: &Upload) -> Result<(), QualityCheckError> {
    if upload.bytes.is_empty() {
        return Err(QualityCheckError::Empty);
    }
    if !ACCEPTED_TYPES.contains(&upload.content_type.as_str()) {
        return Err(QualityCheckError::UnsupportedType(
            upload.content_type.clone(),
        ));
    }
    if upload.bytes.len() > MAX_IMAGE_BYTES {
        return Err(QualityCheckError::TooLarge(upload.bytes.len()));
    }
    Ok(())
}

#[derive(Deserialize)]
struct ServiceError {
    #[serde(alias = "detail", alias = "message")]
    error: String,
}

/// Client for the prediction service.
#[derive(Clone)]
pub struct QualityClient {
    client: reqwest::Client,
    endpoint: Url,
}

impl QualityClient {
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn new(endpoint: Url, timeout: Duration) -> Result<Self, QualityCheckError> {
        Ok(Self {
            client: reqwest::Client::builder().timeout(timeout).build()?,
            endpoint,
        })
    }

    /// Classify one image.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a bad upload, or the service's own
    /// `error` message when it rejects the image.
    #[instrument(skip(self, token, upload), fields(size = upload.bytes.len()))]
    pub async fn check(
        &self,
        token: &SecretString,
        upload: Upload,
    ) -> Result<QualityReport, QualityCheckError> {
        validate_image(&upload)?;

        let part = Part::bytes(upload.bytes)
            .file_name(upload.file_name)
            .mime_str(&upload.content_type)?;
        let form = Form::new().part("file", part);

        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(token.expose_secret())
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ServiceError>(&body)
                .map_or_else(|_| "Gagal menganalisis kualitas produk".to_string(), |e| e.error);
            tracing::warn!(status = %status, message = %message, "Quality check rejected");
            return Err(QualityCheckError::Service {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json::<QualityReport>().await?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn upload(content_type: &str, size: usize) -> Upload {
        Upload {
            file_name: "tomat.jpg".to_string(),
            content_type: content_type.to_string(),
            bytes: vec![0u8; size],
        }
    }

    #[test]
    fn test_validate_image() {
        assert!(validate_image(&upload("image/jpeg", 1024)).is_ok());
        assert!(validate_image(&upload("image/webp", MAX_IMAGE_BYTES)).is_ok());
        assert!(matches!(
            validate_image(&upload("image/gif", 10)),
            Err(QualityCheckError::UnsupportedType(_))
        ));
        assert!(matches!(
            validate_image(&upload("image/png", MAX_IMAGE_BYTES + 1)),
            Err(QualityCheckError::TooLarge(_))
        ));
        assert!(matches!(
            validate_image(&upload("image/png", 0)),
            Err(QualityCheckError::Empty)
        ));
    }

    #[test]
    fn test_report_parsing() {
        let report: QualityReport =
            serde_json::from_str(r#"{"label":"layak","confidence":0.935,"category":"tomat"}"#)
                .unwrap();
        assert!(report.is_fit());
        assert_eq!(report.confidence_percent(), "93.50%");
        assert_eq!(report.details.as_deref(), Some("tomat"));
    }
}
