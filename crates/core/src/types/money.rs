//! Rupiah amounts.
//!
//! The backend prices everything in whole rupiah, so amounts are plain
//! integers. JSON numbers are accepted in integer, float (`65000.0`) or
//! string (`"65000"`) form since backend responses are not consistent.

use core::fmt;
use core::iter::Sum;
use core::ops::Add;

use serde::{Deserialize, Deserializer, Serialize};

/// An amount in Indonesian rupiah.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
#[serde(transparent)]
pub struct Rupiah(i64);

impl Rupiah {
    /// Zero rupiah.
    pub const ZERO: Self = Self(0);

    /// Create an amount from whole rupiah.
    #[must_use]
    pub const fn new(amount: i64) -> Self {
        Self(amount)
    }

    /// The amount in whole rupiah.
    #[must_use]
    pub const fn amount(self) -> i64 {
        self.0
    }

    /// Price of `quantity` units at this unit price.
    ///
    /// Saturates instead of overflowing.
    #[must_use]
    pub fn times(self, quantity: u32) -> Self {
        Self(self.0.saturating_mul(i64::from(quantity)))
    }

    /// Whether the amount is strictly positive.
    #[must_use]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }
}

impl Add for Rupiah {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl Sum for Rupiah {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Self> for Rupiah {
    fn sum<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

impl From<i64> for Rupiah {
    fn from(amount: i64) -> Self {
        Self(amount)
    }
}

/// Formats as `Rp65.000` (Indonesian digit grouping).
impl fmt::Display for Rupiah {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = self.0.unsigned_abs().to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, c) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push('.');
            }
            grouped.push(c);
        }
        if self.0 < 0 {
            write!(f, "-Rp{grouped}")
        } else {
            write!(f, "Rp{grouped}")
        }
    }
}

impl<'de> Deserialize<'de> for Rupiah {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Int(i64),
            Float(f64),
            Text(String),
            Null(()),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Int(v) => Ok(Self(v)),
            Raw::Null(()) => Ok(Self::ZERO),
            #[allow(clippy::cast_possible_truncation)] // rupiah amounts are far below i64::MAX
            Raw::Float(v) => Ok(Self(v.round() as i64)),
            Raw::Text(s) => s
                .trim()
                .parse::<i64>()
                .map(Self)
                .map_err(|_| serde::de::Error::custom(format!("invalid rupiah amount: {s}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_groups_thousands() {
        assert_eq!(Rupiah::new(0).to_string(), "Rp0");
        assert_eq!(Rupiah::new(950).to_string(), "Rp950");
        assert_eq!(Rupiah::new(65_000).to_string(), "Rp65.000");
        assert_eq!(Rupiah::new(1_250_000).to_string(), "Rp1.250.000");
        assert_eq!(Rupiah::new(-25_000).to_string(), "-Rp25.000");
    }

    #[test]
    fn test_times_and_sum() {
        let lines = [Rupiah::new(65_000).times(2), Rupiah::new(32_000).times(1)];
        assert_eq!(lines.iter().sum::<Rupiah>(), Rupiah::new(162_000));
        assert_eq!(Rupiah::new(i64::MAX).times(2), Rupiah::new(i64::MAX));
    }

    #[test]
    fn test_lenient_deserialize() {
        let from_int: Rupiah = serde_json::from_str("65000").unwrap_or_default();
        let from_float: Rupiah = serde_json::from_str("65000.0").unwrap_or_default();
        let from_text: Rupiah = serde_json::from_str("\"65000\"").unwrap_or_default();
        assert_eq!(from_int, Rupiah::new(65_000));
        assert_eq!(from_float, Rupiah::new(65_000));
        assert_eq!(from_text, Rupiah::new(65_000));
        assert!(serde_json::from_str::<Rupiah>("\"murah\"").is_err());
    }
}
