//! Business logic services for storefront.
//!
//! # Services
//!
//! - `checkout` - Order every cart line, then clear the cart
//! - `dashboard` - Merchant dashboard join of items and stock
//! - `orders` - Merchant names for order listings
//! - `quality` - Produce photo quality prediction client

pub mod checkout;
pub mod dashboard;
pub mod orders;
pub mod quality;

pub use checkout::{CheckoutError, CheckoutOutcome, LineFailure, place_orders};
pub use dashboard::{Dashboard, DashboardItemView, build_dashboard};
pub use orders::{merchant_name_of, merchant_names};
pub use quality::{QualityCheckError, QualityClient, QualityReport};
