//! Core types for Pasarku.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod method;
pub mod money;
pub mod status;

pub use id::*;
pub use method::{
    DeliveryMethod, PAYMENT_OPTIONS, PaymentMethod, PaymentOption, SHIPPING_OPTIONS,
    ShippingOption,
};
pub use money::Rupiah;
pub use status::*;
