//! Produce quality check page.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Multipart, State},
    response::IntoResponse,
};
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::filters;
use crate::layout::Layout;
use crate::middleware::RequireAuth;
use crate::routes::form_data::MultipartForm;
use crate::services::quality::{QualityCheckError, QualityReport};
use crate::state::AppState;

const NO_FILE: &str = "Silakan pilih foto produk terlebih dahulu";

#[derive(Template, WebTemplate)]
#[template(path = "quality_check.html")]
pub struct QualityCheckTemplate {
    pub layout: Layout,
    pub report: Option<QualityReport>,
    pub error: Option<String>,
}

pub async fn page(layout: Layout, RequireAuth(_user): RequireAuth) -> impl IntoResponse {
    QualityCheckTemplate {
        layout,
        report: None,
        error: None,
    }
}

#[instrument(skip(state, layout, user, multipart), fields(user_id = %user.claims.uid))]
pub async fn check(
    State(state): State<AppState>,
    layout: Layout,
    RequireAuth(user): RequireAuth,
    multipart: Multipart,
) -> Result<impl IntoResponse> {
    let mut form = MultipartForm::read(multipart).await?;
    let mut page = QualityCheckTemplate {
        layout,
        report: None,
        error: None,
    };

    let Some(upload) = form.take_file("file") else {
        page.error = Some(NO_FILE.to_string());
        return Ok(page);
    };

    match state.quality().check(&user.token, upload).await {
        Ok(report) => {
            tracing::info!(label = %report.label, confidence = report.confidence, "Quality check done");
            page.report = Some(report);
        }
        Err(e @ QualityCheckError::Http(_)) => {
            let message = e.to_string();
            tracing::error!(error = %message, "Quality service unavailable");
            sentry::capture_error(&AppError::Quality(e));
            page.error = Some("Layanan cek kualitas tidak dapat dihubungi. Silakan coba lagi.".to_string());
        }
        Err(e) => page.error = Some(e.to_string()),
    }
    Ok(page)
}
