//! Pasarku Core - Shared domain types and rules.
//!
//! This crate provides the types used across all Pasarku components:
//! - `storefront` - Server-rendered marketplace site over the Pasarku backend
//! - `cli` - Command-line tools for operators
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O and no HTTP
//! clients. Everything the backend owns (users, merchants, items, orders) is
//! mirrored here as plain data; the arithmetic the storefront performs on that
//! data (cart totals, checkout totals) and the client-side form rules live here
//! so they can be tested without a server.
//!
//! # Modules
//!
//! - [`types`] - IDs, money, statuses, roles and checkout methods
//! - [`claims`] - Unverified JWT payload decoding for UI gating
//! - [`nav`] - Navigation links derived from login/owner flags
//! - [`cart`] - Cart line arithmetic
//! - [`checkout`] - Checkout selection and grand total
//! - [`validation`] - Form rules shared by every page

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod checkout;
pub mod claims;
pub mod nav;
pub mod types;
pub mod validation;

pub use cart::{CartLine, CartSummary};
pub use checkout::{CheckoutForm, CheckoutSelection, CheckoutTotals};
pub use claims::{Claims, ClaimsError};
pub use nav::{NavFlags, NavLink, nav_links};
pub use types::*;
pub use validation::{
    ContactForm, ItemForm, LoginForm, MerchantForm, OrderForm, ProfileForm, RegisterForm,
    ValidItem, ValidMerchant, ValidOrder, ValidProfile, ValidationError,
};
