//! Delivery and payment methods.
//!
//! The backend only knows two delivery methods (`antar`, `ambil`) and two
//! payment methods (`cod`, `digital`). The checkout page offers a richer menu
//! of shipping and payment options that map onto those wire values and carry
//! the extra cost shown to the buyer.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use super::money::Rupiah;

/// How an order reaches the buyer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryMethod {
    /// Delivered to the buyer's address.
    #[default]
    Antar,
    /// Picked up at the merchant.
    Ambil,
}

impl DeliveryMethod {
    /// Wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Antar => "antar",
            Self::Ambil => "ambil",
        }
    }

    /// Human label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Antar => "Antar",
            Self::Ambil => "Ambil Sendiri",
        }
    }

    /// Whether the buyer must give an address.
    #[must_use]
    pub const fn requires_address(self) -> bool {
        matches!(self, Self::Antar)
    }
}

impl FromStr for DeliveryMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "antar" => Ok(Self::Antar),
            "ambil" => Ok(Self::Ambil),
            _ => Err(format!("invalid delivery method: {s}")),
        }
    }
}

impl fmt::Display for DeliveryMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How an order is paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PaymentMethod {
    /// Cash on delivery.
    #[default]
    #[serde(rename = "cod")]
    Cod,
    /// Bank transfer, confirmed by the owner from an uploaded proof.
    #[serde(rename = "digital")]
    Transfer,
}

impl PaymentMethod {
    /// Wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cod => "cod",
            Self::Transfer => "digital",
        }
    }

    /// Human label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Cod => "COD",
            Self::Transfer => "Digital (Transfer)",
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cod" => Ok(Self::Cod),
            "digital" | "transfer" => Ok(Self::Transfer),
            _ => Err(format!("invalid payment method: {s}")),
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A payment option offered on the checkout page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaymentOption {
    pub id: u8,
    pub name: &'static str,
    pub fee: Rupiah,
    pub method: PaymentMethod,
}

impl PaymentOption {
    /// Transfers need an uploaded proof of payment.
    #[must_use]
    pub const fn requires_proof(&self) -> bool {
        matches!(self.method, PaymentMethod::Transfer)
    }

    /// Look up an option by its form id.
    #[must_use]
    pub fn by_id(id: u8) -> Option<&'static Self> {
        PAYMENT_OPTIONS.iter().find(|o| o.id == id)
    }
}

/// A shipping option offered on the checkout page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShippingOption {
    pub id: u8,
    pub name: &'static str,
    pub cost: Rupiah,
    pub eta: &'static str,
    pub method: DeliveryMethod,
}

impl ShippingOption {
    /// Every option except pick-up needs an address.
    #[must_use]
    pub const fn requires_address(&self) -> bool {
        self.method.requires_address()
    }

    /// Look up an option by its form id.
    #[must_use]
    pub fn by_id(id: u8) -> Option<&'static Self> {
        SHIPPING_OPTIONS.iter().find(|o| o.id == id)
    }
}

pub const PAYMENT_OPTIONS: [PaymentOption; 2] = [
    PaymentOption {
        id: 1,
        name: "Transfer Bank",
        fee: Rupiah::ZERO,
        method: PaymentMethod::Transfer,
    },
    PaymentOption {
        id: 2,
        name: "COD",
        fee: Rupiah::ZERO,
        method: PaymentMethod::Cod,
    },
];

pub const SHIPPING_OPTIONS: [ShippingOption; 3] = [
    ShippingOption {
        id: 1,
        name: "Ambil di Tempat",
        cost: Rupiah::ZERO,
        eta: "1-2 hari",
        method: DeliveryMethod::Ambil,
    },
    ShippingOption {
        id: 2,
        name: "Diantar",
        cost: Rupiah::ZERO,
        eta: "1-2 hari",
        method: DeliveryMethod::Antar,
    },
    ShippingOption {
        id: 3,
        name: "GoSend Same Day",
        cost: Rupiah::new(25_000),
        eta: "Hari yang sama",
        method: DeliveryMethod::Antar,
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_pickup_skips_address() {
        let needs_address: Vec<&str> = SHIPPING_OPTIONS
            .iter()
            .filter(|o| o.requires_address())
            .map(|o| o.name)
            .collect();
        assert_eq!(needs_address, vec!["Diantar", "GoSend Same Day"]);
    }

    #[test]
    fn test_only_transfer_needs_proof() {
        assert_eq!(PaymentOption::by_id(1).map(PaymentOption::requires_proof), Some(true));
        assert_eq!(PaymentOption::by_id(2).map(PaymentOption::requires_proof), Some(false));
        assert!(PaymentOption::by_id(9).is_none());
    }

    #[test]
    fn test_wire_names() {
        assert_eq!(
            serde_json::to_string(&PaymentMethod::Transfer).ok().as_deref(),
            Some("\"digital\"")
        );
        assert_eq!("ambil".parse::<DeliveryMethod>(), Ok(DeliveryMethod::Ambil));
        assert!("drone".parse::<DeliveryMethod>().is_err());
    }
}
