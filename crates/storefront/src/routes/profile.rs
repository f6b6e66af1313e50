//! Profile page: account details, profile edits and opening a merchant.
//!
//! The page header comes from the token claims so it renders even when the
//! backend profile fetch fails.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Multipart, State},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;
use tracing::instrument;

use pasarku_core::{MerchantForm, MerchantId, ProfileForm, Role};

use crate::api::{NewMerchant, Profile, ProfileUpdate};
use crate::error::{Result, add_breadcrumb};
use crate::filters;
use crate::layout::Layout;
use crate::middleware::{RequireAuth, set_flash};
use crate::models::CurrentUser;
use crate::routes::form_data::MultipartForm;
use crate::services::quality::validate_image;
use crate::state::AppState;

pub const PROFILE_SAVED: &str = "Profil berhasil diperbarui";
pub const MERCHANT_CREATED: &str = "Toko berhasil ditambahkan!";
const PROFILE_UNAVAILABLE: &str = "Gagal membaca data pengguna";

/// Map picker starting point (Palembang).
pub const DEFAULT_LAT: f64 = -2.972_545;
pub const DEFAULT_LNG: f64 = 104.774_436;

#[derive(Template, WebTemplate)]
#[template(path = "profile.html")]
pub struct ProfileTemplate {
    pub layout: Layout,
    pub uid: String,
    pub email: String,
    pub display_name: String,
    pub role: Role,
    pub member_since: Option<String>,
    pub merchant_id: Option<MerchantId>,
    pub form: ProfileForm,
    pub profile_error: Option<String>,
    pub merchant_form: MerchantForm,
    pub merchant_error: Option<String>,
    pub default_lat: f64,
    pub default_lng: f64,
}

impl ProfileTemplate {
    fn new(layout: Layout, user: &CurrentUser, profile: Option<&Profile>) -> Self {
        let claims = &user.claims;
        let form = profile.map_or_else(
            || ProfileForm {
                display_name: claims.display_name().to_string(),
                ..ProfileForm::default()
            },
            |p| ProfileForm {
                display_name: p
                    .display_name
                    .clone()
                    .unwrap_or_else(|| claims.display_name().to_string()),
                phone: p.phone.clone().unwrap_or_default(),
                address: p.address.clone().unwrap_or_default(),
            },
        );

        Self {
            layout,
            uid: claims.uid.to_string(),
            email: claims.email.clone(),
            display_name: claims.display_name().to_string(),
            // The backend profile is authoritative for the role.
            role: profile.map_or_else(|| claims.role(), |p| p.role),
            member_since: claims
                .issued_at()
                .map(|at| at.format("%d/%m/%Y %H:%M").to_string()),
            merchant_id: profile
                .and_then(|p| p.merchant_id.clone())
                .filter(|id| !id.is_empty()),
            form,
            profile_error: None,
            merchant_form: MerchantForm::default(),
            merchant_error: None,
            default_lat: DEFAULT_LAT,
            default_lng: DEFAULT_LNG,
        }
    }
}

/// Fetch the backend profile, logging instead of failing the page.
async fn load_profile(state: &AppState, user: &CurrentUser) -> (Option<Profile>, Option<String>) {
    match state.api().profile(&user.token).await {
        Ok(profile) => (Some(profile), None),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to fetch profile");
            (None, Some(PROFILE_UNAVAILABLE.to_string()))
        }
    }
}

// =============================================================================
// Handlers
// =============================================================================

#[instrument(skip(state, layout, user), fields(user_id = %user.claims.uid))]
pub async fn show(
    State(state): State<AppState>,
    layout: Layout,
    RequireAuth(user): RequireAuth,
) -> impl IntoResponse {
    let (profile, error) = load_profile(&state, &user).await;
    let mut page = ProfileTemplate::new(layout, &user, profile.as_ref());
    page.profile_error = error;
    page
}

#[instrument(skip(state, session, layout, user, form), fields(user_id = %user.claims.uid))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    layout: Layout,
    RequireAuth(user): RequireAuth,
    Form(form): Form<ProfileForm>,
) -> Result<Response> {
    let valid = match form.validate() {
        Ok(valid) => valid,
        Err(e) => {
            let (profile, _) = load_profile(&state, &user).await;
            let mut page = ProfileTemplate::new(layout, &user, profile.as_ref());
            page.form = form;
            page.profile_error = Some(e.to_string());
            return Ok(page.into_response());
        }
    };

    let update = ProfileUpdate {
        display_name: valid.display_name,
        phone: valid.phone,
        address: valid.address,
    };
    if let Err(e) = state.api().update_profile(&user.token, &update).await {
        tracing::warn!(error = %e, "Profile update failed");
        let (profile, _) = load_profile(&state, &user).await;
        let mut page = ProfileTemplate::new(layout, &user, profile.as_ref());
        page.form = form;
        page.profile_error = Some(e.user_message());
        return Ok(page.into_response());
    }

    set_flash(&session, PROFILE_SAVED).await?;
    Ok(Redirect::to("/profile").into_response())
}

/// Open a merchant for the current user and go to its dashboard.
#[instrument(skip(state, session, layout, user, multipart), fields(user_id = %user.claims.uid))]
pub async fn create_merchant(
    State(state): State<AppState>,
    session: Session,
    layout: Layout,
    RequireAuth(user): RequireAuth,
    multipart: Multipart,
) -> Result<Response> {
    let mut upload = MultipartForm::read(multipart).await?;
    let form = MerchantForm {
        name: upload.text("name"),
        category: upload.text("category"),
        lat: upload.text("lat"),
        lng: upload.text("lng"),
    };
    let photo = upload.take_file("photo");

    let checked = form.validate().map_err(|e| e.to_string()).and_then(|valid| {
        match &photo {
            Some(photo) => validate_image(photo).map_err(|e| e.to_string()),
            None => Ok(()),
        }
        .map(|()| valid)
    });
    let valid = match checked {
        Ok(valid) => valid,
        Err(message) => {
            let (profile, _) = load_profile(&state, &user).await;
            let mut page = ProfileTemplate::new(layout, &user, profile.as_ref());
            page.merchant_form = form;
            page.merchant_error = Some(message);
            return Ok(page.into_response());
        }
    };

    let merchant = NewMerchant::from(valid);
    match state.api().create_merchant(&user.token, &merchant, photo).await {
        Ok(id) => {
            add_breadcrumb("merchant", "Merchant created", &[("merchant_id", id.as_str())]);
            state.api().invalidate_catalog();
            set_flash(&session, MERCHANT_CREATED).await?;
            Ok(Redirect::to(&format!("/dashboard-toko/{}", urlencoding::encode(id.as_str())))
                .into_response())
        }
        Err(e) => {
            tracing::warn!(error = %e, "Merchant creation failed");
            let (profile, _) = load_profile(&state, &user).await;
            let mut page = ProfileTemplate::new(layout, &user, profile.as_ref());
            page.merchant_form = form;
            page.merchant_error = Some(format!("Gagal menambah toko: {}", e.user_message()));
            Ok(page.into_response())
        }
    }
}
