//! Multipart form reading.
//!
//! Upload forms mix text fields with an optional file. Browsers send an empty
//! part for an untouched file input; those are dropped so "no file" and
//! "empty file" look the same to handlers.

use std::collections::HashMap;

use axum::extract::Multipart;
use axum::extract::multipart::MultipartError;

use crate::api::Upload;
use crate::error::AppError;

/// Largest request body accepted on upload routes.
pub const UPLOAD_BODY_LIMIT: usize = 6 * 1024 * 1024;

#[derive(Debug, Default)]
pub struct MultipartForm {
    fields: HashMap<String, String>,
    files: HashMap<String, Upload>,
}

impl MultipartForm {
    /// Read every part of `multipart`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::BadRequest`] for a malformed or oversized body.
    pub async fn read(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut form = Self::default();
        while let Some(field) = multipart.next_field().await.map_err(bad_multipart)? {
            let Some(name) = field.name().map(str::to_owned) else {
                continue;
            };

            if let Some(file_name) = field.file_name().map(str::to_owned) {
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_owned();
                let bytes = field.bytes().await.map_err(bad_multipart)?;
                if file_name.is_empty() && bytes.is_empty() {
                    continue;
                }
                form.files.insert(
                    name,
                    Upload {
                        file_name,
                        content_type,
                        bytes: bytes.to_vec(),
                    },
                );
            } else {
                let value = field.text().await.map_err(bad_multipart)?;
                form.fields.insert(name, value);
            }
        }
        Ok(form)
    }

    /// Text field value, empty when absent.
    #[must_use]
    pub fn text(&self, name: &str) -> String {
        self.fields.get(name).cloned().unwrap_or_default()
    }

    /// Take an uploaded file out of the form.
    pub fn take_file(&mut self, name: &str) -> Option<Upload> {
        self.files.remove(name)
    }

    #[must_use]
    pub fn has_file(&self, name: &str) -> bool {
        self.files.contains_key(name)
    }
}

fn bad_multipart(e: MultipartError) -> AppError {
    tracing::warn!(error = %e, "Malformed multipart body");
    AppError::BadRequest("Data formulir tidak valid".to_string())
}
