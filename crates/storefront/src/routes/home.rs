//! Home and about pages.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use tracing::instrument;

use crate::api::ProductListing;
use crate::filters;
use crate::layout::Layout;
use crate::state::AppState;

/// Products shown on the home page.
const FEATURED_COUNT: usize = 6;

#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub layout: Layout,
    pub featured: Vec<ProductListing>,
}

#[derive(Template, WebTemplate)]
#[template(path = "about.html")]
pub struct AboutTemplate {
    pub layout: Layout,
}

/// Home page with a few in-stock products from the cached catalog.
///
/// A catalog failure only hides the featured section.
#[instrument(skip(state, layout))]
pub async fn home(State(state): State<AppState>, layout: Layout) -> impl IntoResponse {
    let featured = match state.api().search_products("").await {
        Ok(listings) => listings
            .into_iter()
            .filter(ProductListing::in_stock)
            .take(FEATURED_COUNT)
            .collect(),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load featured products");
            Vec::new()
        }
    };

    HomeTemplate { layout, featured }
}

pub async fn about(layout: Layout) -> impl IntoResponse {
    AboutTemplate { layout }
}
