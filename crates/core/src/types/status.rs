//! Order statuses and user roles.
//!
//! Status transitions are owned by the backend. The storefront only encodes
//! the single manual transition an owner may perform from the oversight page:
//! confirming a transfer payment moves an order from
//! `konfirmasi pembayaran` back into the regular `pending` queue.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised when a status change is refused client-side.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StatusError {
    /// Owners may only confirm payments.
    #[error("Hanya dapat mengubah status dari 'konfirmasi pembayaran' menjadi 'pending'")]
    OwnerTransitionNotAllowed {
        /// Current status of the order.
        from: OrderStatus,
        /// Requested status.
        to: OrderStatus,
    },
    /// The requested status is not one a merchant can pick.
    #[error("Status pesanan tidak dikenal: {0}")]
    UnknownStatus(String),
}

/// Order status as reported by the backend.
///
/// Unknown values are kept verbatim in [`OrderStatus::Other`] so a new backend
/// status never breaks order listings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OrderStatus {
    /// Accepted, waiting for the merchant.
    #[default]
    Pending,
    /// Handed to delivery.
    Shipped,
    /// Received by the buyer.
    Completed,
    /// Canceled by merchant or buyer.
    Canceled,
    /// Transfer payment uploaded, waiting for the owner to confirm it.
    AwaitingPaymentConfirmation,
    /// Any status string this client does not know about.
    Other(String),
}

impl OrderStatus {
    /// Statuses a merchant can choose from on the order list.
    pub const MERCHANT_CHOICES: [Self; 4] =
        [Self::Pending, Self::Shipped, Self::Completed, Self::Canceled];

    /// Wire representation used by the backend.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Pending => "pending",
            Self::Shipped => "shipped",
            Self::Completed => "completed",
            Self::Canceled => "canceled",
            Self::AwaitingPaymentConfirmation => "konfirmasi pembayaran",
            Self::Other(s) => s,
        }
    }

    /// Short Indonesian label for badges.
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::Pending => "Menunggu",
            Self::Shipped => "Dikirim",
            Self::Completed => "Selesai",
            Self::Canceled => "Dibatalkan",
            Self::AwaitingPaymentConfirmation => "Konfirmasi Pembayaran",
            Self::Other(s) => s,
        }
    }

    /// CSS modifier used by the status badge.
    #[must_use]
    pub const fn badge_class(&self) -> &'static str {
        match self {
            Self::Completed => "badge-success",
            Self::Pending => "badge-warning",
            Self::Shipped => "badge-info",
            Self::AwaitingPaymentConfirmation => "badge-attention",
            Self::Canceled | Self::Other(_) => "badge-danger",
        }
    }

    /// Whether this status needs the owner's payment confirmation.
    #[must_use]
    pub const fn awaits_payment_confirmation(&self) -> bool {
        matches!(self, Self::AwaitingPaymentConfirmation)
    }

    /// Parse a status a merchant submitted from the order list.
    ///
    /// # Errors
    ///
    /// Returns [`StatusError::UnknownStatus`] for anything outside
    /// [`Self::MERCHANT_CHOICES`].
    pub fn parse_merchant_choice(s: &str) -> Result<Self, StatusError> {
        let status = Self::from(s.trim().to_owned());
        if Self::MERCHANT_CHOICES.contains(&status) {
            Ok(status)
        } else {
            Err(StatusError::UnknownStatus(s.to_owned()))
        }
    }
}

impl From<String> for OrderStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "pending" => Self::Pending,
            "shipped" => Self::Shipped,
            "completed" => Self::Completed,
            "canceled" | "cancelled" => Self::Canceled,
            "konfirmasi pembayaran" => Self::AwaitingPaymentConfirmation,
            _ => Self::Other(s),
        }
    }
}

impl From<OrderStatus> for String {
    fn from(status: OrderStatus) -> Self {
        match status {
            OrderStatus::Other(s) => s,
            known => known.as_str().to_owned(),
        }
    }
}

impl FromStr for OrderStatus {
    type Err = core::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s.to_owned()))
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether an owner may move an order from `from` to `to`.
#[must_use]
pub const fn owner_transition_allowed(from: &OrderStatus, to: &OrderStatus) -> bool {
    matches!(
        (from, to),
        (OrderStatus::AwaitingPaymentConfirmation, OrderStatus::Pending)
    )
}

/// Check an owner-initiated status change before it is sent to the backend.
///
/// # Errors
///
/// Returns [`StatusError::OwnerTransitionNotAllowed`] unless the change is
/// `konfirmasi pembayaran` to `pending`.
pub fn check_owner_transition(from: &OrderStatus, to: &OrderStatus) -> Result<(), StatusError> {
    if owner_transition_allowed(from, to) {
        Ok(())
    } else {
        Err(StatusError::OwnerTransitionNotAllowed {
            from: from.clone(),
            to: to.clone(),
        })
    }
}

/// Role carried in the auth token and the backend profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    /// Regular buyer (and possibly merchant).
    #[default]
    User,
    /// Marketplace owner with cross-merchant oversight.
    Owner,
}

impl Role {
    /// Wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Owner => "owner",
        }
    }

    /// Whether this role may open the owner page.
    #[must_use]
    pub const fn is_owner(self) -> bool {
        matches!(self, Self::Owner)
    }
}

impl From<String> for Role {
    fn from(s: String) -> Self {
        if s.eq_ignore_ascii_case("owner") {
            Self::Owner
        } else {
            Self::User
        }
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        role.as_str().to_owned()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
