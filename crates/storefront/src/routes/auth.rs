//! Login, registration and logout.
//!
//! Credentials go straight to the backend; only the returned token (and the
//! claims read from it) is kept, in the server-side session.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use pasarku_core::{LoginForm, RegisterForm};

use crate::api::ApiError;
use crate::error::{clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::layout::Layout;
use crate::middleware::{clear_current_user, set_current_user};
use crate::models::CurrentUser;
use crate::state::AppState;

pub const LOGIN_FAILED: &str = "Email atau password salah";
pub const REGISTER_OK: &str = "Register berhasil! Silakan login.";
pub const REGISTER_FAILED: &str = "Register gagal. Email mungkin sudah terdaftar.";

// =============================================================================
// Query Types
// =============================================================================

/// Query parameters for error/success display.
#[derive(Debug, Default, Deserialize)]
pub struct MessageQuery {
    pub error: Option<String>,
    pub success: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub layout: Layout,
    pub email: String,
    pub error: Option<String>,
    pub success: Option<String>,
}

#[derive(Template, WebTemplate)]
#[template(path = "auth/register.html")]
pub struct RegisterTemplate {
    pub layout: Layout,
    pub name: String,
    pub email: String,
    pub error: Option<String>,
    pub success: Option<String>,
}

// =============================================================================
// Login
// =============================================================================

pub async fn login_page(layout: Layout, Query(query): Query<MessageQuery>) -> Response {
    if layout.is_logged_in() {
        return Redirect::to("/").into_response();
    }
    LoginTemplate {
        layout,
        email: String::new(),
        error: query.error,
        success: query.success,
    }
    .into_response()
}

#[instrument(skip(state, session, layout, form), fields(email = %form.email))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    layout: Layout,
    Form(form): Form<LoginForm>,
) -> Response {
    let failed = |layout: Layout, email: String, message: String| {
        LoginTemplate {
            layout,
            email,
            error: Some(message),
            success: None,
        }
        .into_response()
    };

    if let Err(e) = form.validate() {
        return failed(layout, form.email, e.to_string());
    }

    let token = match state.api().login(form.email.trim(), &form.password).await {
        Ok(response) => response.token,
        Err(e @ ApiError::Http(_)) => {
            tracing::warn!(error = %e, "Login request failed");
            return failed(layout, form.email, e.user_message());
        }
        Err(e) => {
            tracing::info!(error = %e, "Login rejected");
            return failed(layout, form.email, LOGIN_FAILED.to_string());
        }
    };

    let user = match CurrentUser::from_token(token) {
        Ok(user) => user,
        Err(e) => {
            tracing::warn!(error = %e, "Backend issued an unreadable token");
            return failed(layout, form.email, LOGIN_FAILED.to_string());
        }
    };

    if let Err(e) = set_current_user(&session, &user).await {
        tracing::error!(error = %e, "Failed to store session");
        return failed(
            layout,
            form.email,
            "Gagal menyimpan sesi, silakan coba lagi".to_string(),
        );
    }

    set_sentry_user(&user.claims.uid, Some(&user.claims.email));
    tracing::info!(user_id = %user.claims.uid, role = %user.role(), "User logged in");
    Redirect::to("/").into_response()
}

// =============================================================================
// Registration
// =============================================================================

pub async fn register_page(layout: Layout) -> Response {
    if layout.is_logged_in() {
        return Redirect::to("/").into_response();
    }
    RegisterTemplate {
        layout,
        name: String::new(),
        email: String::new(),
        error: None,
        success: None,
    }
    .into_response()
}

#[instrument(skip(state, layout, form), fields(email = %form.email))]
pub async fn register(
    State(state): State<AppState>,
    layout: Layout,
    Form(form): Form<RegisterForm>,
) -> impl IntoResponse {
    let mut page = RegisterTemplate {
        layout,
        name: form.name.clone(),
        email: form.email.clone(),
        error: None,
        success: None,
    };

    let email = match form.validate() {
        Ok(email) => email,
        Err(e) => {
            page.error = Some(e.to_string());
            return page;
        }
    };

    match state
        .api()
        .register(form.name.trim(), &email, &form.password)
        .await
    {
        Ok(()) => {
            tracing::info!("User registered");
            page.name.clear();
            page.email.clear();
            page.success = Some(REGISTER_OK.to_string());
        }
        Err(e) => {
            tracing::warn!(error = %e, "Registration failed");
            page.error = Some(REGISTER_FAILED.to_string());
        }
    }
    page
}

// =============================================================================
// Logout
// =============================================================================

pub async fn logout(session: Session) -> Redirect {
    if let Err(e) = clear_current_user(&session).await {
        tracing::error!(error = %e, "Failed to clear session");
    }
    clear_sentry_user();
    Redirect::to("/auth/login")
}
