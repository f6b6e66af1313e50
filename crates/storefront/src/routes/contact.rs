//! Contact form.
//!
//! Messages go to `/send-message`. With a merchant id (from a product page)
//! the message lands in that merchant's inbox; without one it goes to the
//! Pasarku team.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::IntoResponse,
};
use serde::Deserialize;
use tracing::instrument;

use pasarku_core::{ContactForm, MerchantId};

use crate::api::ContactMessage;
use crate::filters;
use crate::layout::Layout;
use crate::middleware::OptionalAuth;
use crate::state::AppState;

pub const CONTACT_SENT: &str =
    "Terima kasih! Pesan Anda telah terkirim. Kami akan segera menghubungi Anda.";
pub const CONTACT_FAILED: &str = "Gagal mengirim pesan. Silakan coba lagi.";

#[derive(Debug, Default, Deserialize)]
pub struct ContactQuery {
    pub merchant: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ContactSubmission {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub merchant_id: Option<String>,
}

#[derive(Template, WebTemplate)]
#[template(path = "contact.html")]
pub struct ContactTemplate {
    pub layout: Layout,
    pub form: ContactForm,
    pub merchant_id: Option<String>,
    pub error: Option<String>,
    pub success: bool,
}

pub async fn contact_page(
    layout: Layout,
    OptionalAuth(user): OptionalAuth,
    Query(query): Query<ContactQuery>,
) -> impl IntoResponse {
    let form = user.map_or_else(ContactForm::default, |u| ContactForm {
        name: u.claims.display_name.clone().unwrap_or_default(),
        email: u.claims.email.clone(),
        ..ContactForm::default()
    });

    ContactTemplate {
        layout,
        form,
        merchant_id: query.merchant.filter(|m| !m.trim().is_empty()),
        error: None,
        success: false,
    }
}

#[instrument(skip(state, layout, user, submission))]
pub async fn send(
    State(state): State<AppState>,
    layout: Layout,
    OptionalAuth(user): OptionalAuth,
    Form(submission): Form<ContactSubmission>,
) -> impl IntoResponse {
    let merchant_id = submission.merchant_id.filter(|m| !m.trim().is_empty());
    let form = ContactForm {
        name: submission.name,
        email: submission.email,
        subject: submission.subject,
        message: submission.message,
    };
    let mut page = ContactTemplate {
        layout,
        form,
        merchant_id,
        error: None,
        success: false,
    };

    let valid = match page.form.validate() {
        Ok(valid) => valid,
        Err(e) => {
            page.error = Some(e.to_string());
            return page;
        }
    };

    let message = ContactMessage {
        name: valid.name,
        email: valid.email,
        subject: valid.subject,
        message: valid.message,
        merchant_id: page.merchant_id.as_deref().map(MerchantId::new),
    };

    match state
        .api()
        .send_message(user.as_ref().map(|u| &u.token), &message)
        .await
    {
        Ok(()) => {
            tracing::info!(to_merchant = message.merchant_id.is_some(), "Contact message sent");
            page.form = ContactForm::default();
            page.success = true;
        }
        Err(e) => {
            tracing::warn!(error = %e, "Contact message failed");
            page.error = Some(CONTACT_FAILED.to_string());
        }
    }
    page
}
