//! Client-side form rules.
//!
//! The backend enforces every rule again; these checks exist so a form is
//! never submitted with empty required fields or values below the stated
//! minimums. Error messages are the Indonesian strings shown inline on the
//! page.

mod forms;

pub use forms::{
    ContactForm, ItemForm, LoginForm, MerchantForm, OrderForm, ProfileForm, RegisterForm,
    ValidItem, ValidMerchant, ValidOrder, ValidProfile,
};

use thiserror::Error;

use crate::types::Rupiah;

/// Minimum password length accepted at registration.
pub const MIN_PASSWORD_LENGTH: usize = 6;
/// Lowest item price in rupiah.
pub const MIN_PRICE: Rupiah = Rupiah::new(1_000);
/// Accepted phone number length, in digits.
pub const PHONE_DIGITS: core::ops::RangeInclusive<usize> = 10..=15;

/// A form rule that failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} wajib diisi")]
    Required(&'static str),
    #[error("Password minimal {} karakter", MIN_PASSWORD_LENGTH)]
    PasswordTooShort,
    #[error("Nomor telepon harus 10-15 digit")]
    PhoneInvalid,
    #[error("Format email tidak valid")]
    InvalidEmail,
    #[error("Harga minimal {}", MIN_PRICE)]
    PriceTooLow,
    #[error("{0} harus berupa angka")]
    InvalidNumber(&'static str),
    #[error("Jumlah minimal 1")]
    QuantityTooLow,
    #[error("Stok produk habis")]
    OutOfStock,
    #[error("Jumlah harus antara 1 dan {max}")]
    QuantityOutOfRange { max: u32 },
    #[error("Lokasi toko tidak valid")]
    InvalidCoordinates,
    #[error("Semua field wajib diisi kecuali foto")]
    MerchantFieldsMissing,
    #[error("Keranjang belanja kosong")]
    EmptyCart,
    #[error("Produk tidak ada di keranjang")]
    UnknownCartEntry,
    #[error("Harap pilih metode pembayaran dan pengiriman.")]
    MethodsNotSelected,
    #[error("Harap masukkan alamat pengiriman.")]
    AddressRequired,
    #[error("Harap unggah bukti pembayaran.")]
    ProofRequired,
}

/// Trimmed `value`, or [`ValidationError::Required`] naming `field`.
///
/// # Errors
///
/// Fails when `value` is empty after trimming.
pub fn require<'a>(field: &'static str, value: &'a str) -> Result<&'a str, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(ValidationError::Required(field))
    } else {
        Ok(trimmed)
    }
}

/// # Errors
///
/// Fails when the password is empty or shorter than [`MIN_PASSWORD_LENGTH`] characters.
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.is_empty() {
        return Err(ValidationError::Required("Password"));
    }
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ValidationError::PasswordTooShort);
    }
    Ok(())
}

/// Normalize a phone number to its digits (keeping a leading `+`).
///
/// Spaces, dashes, dots and parentheses are ignored.
///
/// # Errors
///
/// Fails when anything else appears or the digit count is outside 10-15.
pub fn validate_phone(phone: &str) -> Result<String, ValidationError> {
    let trimmed = phone.trim();
    let (plus, rest) = trimmed
        .strip_prefix('+')
        .map_or(("", trimmed), |rest| ("+", rest));

    let mut digits = String::with_capacity(rest.len());
    for c in rest.chars() {
        match c {
            '0'..='9' => digits.push(c),
            ' ' | '-' | '.' | '(' | ')' => {}
            _ => return Err(ValidationError::PhoneInvalid),
        }
    }

    if PHONE_DIGITS.contains(&digits.len()) {
        Ok(format!("{plus}{digits}"))
    } else {
        Err(ValidationError::PhoneInvalid)
    }
}

/// Basic structural email check: one `@`, non-empty local part, dotted domain.
///
/// # Errors
///
/// Fails on empty input or a malformed address.
pub fn validate_email(email: &str) -> Result<String, ValidationError> {
    let email = require("Email", email)?;
    let mut parts = email.split('@');
    let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(ValidationError::InvalidEmail);
    };
    let domain_ok = domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !domain.contains(char::is_whitespace);
    if local.is_empty() || local.contains(char::is_whitespace) || !domain_ok {
        return Err(ValidationError::InvalidEmail);
    }
    Ok(email.to_lowercase())
}

/// Parse a submitted price and enforce [`MIN_PRICE`].
///
/// # Errors
///
/// Fails when the value is empty, not a whole number or below the minimum.
/// Dots are only accepted as thousands separators (`65.000`), so `1000.5`
/// and `1.0.0.0` are rejected rather than read as larger amounts.
pub fn validate_price(raw: &str) -> Result<Rupiah, ValidationError> {
    let raw = require("Harga", raw)?;
    let amount = grouped_digits(raw)
        .and_then(|digits| digits.parse::<i64>().ok())
        .ok_or(ValidationError::InvalidNumber("Harga"))?;
    let price = Rupiah::new(amount);
    if price < MIN_PRICE {
        return Err(ValidationError::PriceTooLow);
    }
    Ok(price)
}

/// Digits of a whole number written plain or grouped by thousands with dots.
fn grouped_digits(raw: &str) -> Option<String> {
    let groups: Vec<&str> = raw.split('.').collect();
    let (first, rest) = groups.split_first()?;
    let all_digits = |g: &str| !g.is_empty() && g.bytes().all(|b| b.is_ascii_digit());

    let well_formed = all_digits(first)
        && (rest.is_empty() || first.len() <= 3)
        && rest.iter().all(|g| g.len() == 3 && all_digits(g));
    well_formed.then(|| groups.concat())
}

/// Parse a submitted quantity, at least 1 and at most `stock` when known.
///
/// # Errors
///
/// Fails when the product is out of stock, or the value is not a number or
/// outside the allowed range.
pub fn validate_quantity(raw: &str, stock: Option<u32>) -> Result<u32, ValidationError> {
    if stock == Some(0) {
        return Err(ValidationError::OutOfStock);
    }
    let raw = require("Jumlah", raw)?;
    let quantity = raw
        .parse::<i64>()
        .map_err(|_| ValidationError::InvalidNumber("Jumlah"))?;

    match stock {
        Some(max) if quantity < 1 || quantity > i64::from(max) => {
            Err(ValidationError::QuantityOutOfRange { max })
        }
        _ if quantity < 1 => Err(ValidationError::QuantityTooLow),
        _ => u32::try_from(quantity).map_err(|_| ValidationError::InvalidNumber("Jumlah")),
    }
}

/// Parse a latitude/longitude pair.
///
/// # Errors
///
/// Fails when either value is not a finite number or out of range.
pub fn validate_coordinates(lat: &str, lng: &str) -> Result<(f64, f64), ValidationError> {
    let lat = lat
        .trim()
        .parse::<f64>()
        .map_err(|_| ValidationError::InvalidCoordinates)?;
    let lng = lng
        .trim()
        .parse::<f64>()
        .map_err(|_| ValidationError::InvalidCoordinates)?;
    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
        return Err(ValidationError::InvalidCoordinates);
    }
    Ok((lat, lng))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_minimum() {
        assert_eq!(validate_password(""), Err(ValidationError::Required("Password")));
        assert_eq!(validate_password("12345"), Err(ValidationError::PasswordTooShort));
        assert!(validate_password("123456").is_ok());
    }

    #[test]
    fn test_phone_digit_range() {
        assert_eq!(validate_phone("0812-3456-789"), Ok("08123456789".to_owned()));
        assert_eq!(validate_phone("+62 812 3456 7890"), Ok("+6281234567890".to_owned()));
        assert_eq!(validate_phone("081234567"), Err(ValidationError::PhoneInvalid));
        assert_eq!(validate_phone("0812345678901234"), Err(ValidationError::PhoneInvalid));
        assert_eq!(validate_phone("0812abc45678"), Err(ValidationError::PhoneInvalid));
    }

    #[test]
    fn test_price_minimum() {
        assert_eq!(validate_price("999"), Err(ValidationError::PriceTooLow));
        assert_eq!(validate_price("1000"), Ok(Rupiah::new(1_000)));
        assert_eq!(validate_price("65.000"), Ok(Rupiah::new(65_000)));
        assert_eq!(validate_price(""), Err(ValidationError::Required("Harga")));
        assert_eq!(validate_price("gratis"), Err(ValidationError::InvalidNumber("Harga")));
    }

    #[test]
    fn test_price_thousands_grouping() {
        assert_eq!(validate_price("1.250.000"), Ok(Rupiah::new(1_250_000)));
        assert_eq!(validate_price("15000"), Ok(Rupiah::new(15_000)));
        for raw in ["1000.5", "1.0.0.0", "65.00", "1234.000", ".500", "5.000.", "-5000"] {
            assert_eq!(
                validate_price(raw),
                Err(ValidationError::InvalidNumber("Harga")),
                "{raw}"
            );
        }
    }

    #[test]
    fn test_quantity_bounds() {
        assert_eq!(validate_quantity("0", None), Err(ValidationError::QuantityTooLow));
        assert_eq!(validate_quantity("3", None), Ok(3));
        assert_eq!(
            validate_quantity("6", Some(5)),
            Err(ValidationError::QuantityOutOfRange { max: 5 })
        );
        assert_eq!(
            validate_quantity("0", Some(5)),
            Err(ValidationError::QuantityOutOfRange { max: 5 })
        );
        assert_eq!(validate_quantity("5", Some(5)), Ok(5));
        assert_eq!(validate_quantity("1", Some(0)), Err(ValidationError::OutOfStock));
    }

    #[test]
    fn test_email_shape() {
        assert_eq!(validate_email(" Budi@Pasarku.id "), Ok("budi@pasarku.id".to_owned()));
        assert_eq!(validate_email("budi"), Err(ValidationError::InvalidEmail));
        assert_eq!(validate_email("@pasarku.id"), Err(ValidationError::InvalidEmail));
        assert_eq!(validate_email("budi@localhost"), Err(ValidationError::InvalidEmail));
        assert_eq!(validate_email("a@b@c.id"), Err(ValidationError::InvalidEmail));
    }

    #[test]
    fn test_coordinates() {
        assert_eq!(
            validate_coordinates("-2.972545", "104.774436"),
            Ok((-2.972_545, 104.774_436))
        );
        assert_eq!(
            validate_coordinates("91", "0"),
            Err(ValidationError::InvalidCoordinates)
        );
        assert_eq!(
            validate_coordinates("", "0"),
            Err(ValidationError::InvalidCoordinates)
        );
    }

    #[test]
    fn test_messages_are_user_facing() {
        assert_eq!(ValidationError::PriceTooLow.to_string(), "Harga minimal Rp1.000");
        assert_eq!(
            ValidationError::Required("Nama").to_string(),
            "Nama wajib diisi"
        );
    }
}
