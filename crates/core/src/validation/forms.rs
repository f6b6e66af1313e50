//! Submitted forms and their validated counterparts.
//!
//! Numeric fields are kept as strings so a bad value produces an inline
//! message instead of a form extractor rejection.

use serde::Deserialize;

use super::{
    ValidationError, require, validate_coordinates, validate_email, validate_password,
    validate_phone, validate_price, validate_quantity,
};
use crate::types::{DeliveryMethod, PaymentMethod, Rupiah};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl LoginForm {
    /// # Errors
    ///
    /// Fails when either field is empty.
    pub fn validate(&self) -> Result<(), ValidationError> {
        require("Email", &self.email)?;
        if self.password.is_empty() {
            return Err(ValidationError::Required("Password"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegisterForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl RegisterForm {
    /// Returns the normalized email.
    ///
    /// # Errors
    ///
    /// Fails on a missing name, malformed email or short password.
    pub fn validate(&self) -> Result<String, ValidationError> {
        require("Nama Lengkap", &self.name)?;
        let email = validate_email(&self.email)?;
        validate_password(&self.password)?;
        Ok(email)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileForm {
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidProfile {
    pub display_name: String,
    pub phone: Option<String>,
    pub address: Option<String>,
}

impl ProfileForm {
    /// Phone and address are optional, but a phone that is given must be valid.
    ///
    /// # Errors
    ///
    /// Fails on an empty display name or an invalid phone number.
    pub fn validate(&self) -> Result<ValidProfile, ValidationError> {
        let display_name = require("Nama", &self.display_name)?.to_owned();
        let phone = match self.phone.trim() {
            "" => None,
            p => Some(validate_phone(p)?),
        };
        let address = Some(self.address.trim())
            .filter(|a| !a.is_empty())
            .map(str::to_owned);
        Ok(ValidProfile {
            display_name,
            phone,
            address,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MerchantForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub lat: String,
    #[serde(default)]
    pub lng: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidMerchant {
    pub name: String,
    pub category: String,
    pub lat: f64,
    pub lng: f64,
}

impl MerchantForm {
    /// Every field except the photo is required.
    ///
    /// # Errors
    ///
    /// Fails with [`ValidationError::MerchantFieldsMissing`] when a field is
    /// blank and [`ValidationError::InvalidCoordinates`] when the map position
    /// does not parse.
    pub fn validate(&self) -> Result<ValidMerchant, ValidationError> {
        let fields = [&self.name, &self.category, &self.lat, &self.lng];
        if fields.iter().any(|f| f.trim().is_empty()) {
            return Err(ValidationError::MerchantFieldsMissing);
        }
        let (lat, lng) = validate_coordinates(&self.lat, &self.lng)?;
        Ok(ValidMerchant {
            name: self.name.trim().to_owned(),
            category: self.category.trim().to_owned(),
            lat,
            lng,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ItemForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub stock: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidItem {
    pub name: String,
    pub category: String,
    pub price: Rupiah,
    pub stock: u32,
}

impl ItemForm {
    /// # Errors
    ///
    /// Fails on blank name/category, a price below the minimum or a stock
    /// that is not a non-negative whole number. An empty stock means zero.
    pub fn validate(&self) -> Result<ValidItem, ValidationError> {
        let name = require("Nama Produk", &self.name)?.to_owned();
        let category = require("Kategori", &self.category)?.to_owned();
        let price = validate_price(&self.price)?;
        let stock = match self.stock.trim() {
            "" => 0,
            s => s
                .parse::<u32>()
                .map_err(|_| ValidationError::InvalidNumber("Stok"))?,
        };
        Ok(ValidItem {
            name,
            category,
            price,
            stock,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct OrderForm {
    #[serde(default = "default_quantity")]
    pub quantity: String,
    #[serde(default)]
    pub delivery_method: DeliveryMethod,
    #[serde(default)]
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub address: String,
}

fn default_quantity() -> String {
    "1".to_owned()
}

impl Default for OrderForm {
    fn default() -> Self {
        Self {
            quantity: default_quantity(),
            delivery_method: DeliveryMethod::default(),
            payment_method: PaymentMethod::default(),
            address: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidOrder {
    pub quantity: u32,
    pub delivery_method: DeliveryMethod,
    pub payment_method: PaymentMethod,
    pub address: Option<String>,
}

impl OrderForm {
    /// Validate a direct order from the product page.
    ///
    /// # Errors
    ///
    /// Fails when the product is out of stock, delivery needs an address that
    /// is missing, or the quantity is outside `1..=stock`.
    pub fn validate(&self, stock: u32) -> Result<ValidOrder, ValidationError> {
        if stock == 0 {
            return Err(ValidationError::OutOfStock);
        }
        let address = self.address.trim();
        if self.delivery_method.requires_address() && address.is_empty() {
            return Err(ValidationError::AddressRequired);
        }
        let quantity = validate_quantity(&self.quantity, Some(stock))?;
        Ok(ValidOrder {
            quantity,
            delivery_method: self.delivery_method,
            payment_method: self.payment_method,
            address: self
                .delivery_method
                .requires_address()
                .then(|| address.to_owned()),
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub message: String,
}

impl ContactForm {
    /// # Errors
    ///
    /// Fails when any field is blank or the email is malformed.
    pub fn validate(&self) -> Result<Self, ValidationError> {
        Ok(Self {
            name: require("Nama", &self.name)?.to_owned(),
            email: validate_email(&self.email)?,
            subject: require("Subjek", &self.subject)?.to_owned(),
            message: require("Pesan", &self.message)?.to_owned(),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_register_blocks_short_password() {
        let form = RegisterForm {
            name: "Budi".to_owned(),
            email: "budi@pasarku.id".to_owned(),
            password: "abc".to_owned(),
        };
        assert_eq!(form.validate(), Err(ValidationError::PasswordTooShort));
    }

    #[test]
    fn test_register_blocks_missing_name() {
        let form = RegisterForm {
            name: "  ".to_owned(),
            email: "budi@pasarku.id".to_owned(),
            password: "rahasia1".to_owned(),
        };
        assert_eq!(form.validate(), Err(ValidationError::Required("Nama Lengkap")));
    }

    #[test]
    fn test_profile_phone_optional_but_checked() {
        let mut form = ProfileForm {
            display_name: "Budi".to_owned(),
            ..ProfileForm::default()
        };
        assert_eq!(form.validate().unwrap().phone, None);

        form.phone = "12345".to_owned();
        assert_eq!(form.validate(), Err(ValidationError::PhoneInvalid));

        form.phone = "081234567890".to_owned();
        assert_eq!(
            form.validate().unwrap().phone.as_deref(),
            Some("081234567890")
        );
    }

    #[test]
    fn test_merchant_requires_everything_but_photo() {
        let form = MerchantForm {
            name: "Toko Makmur".to_owned(),
            category: "Sembako".to_owned(),
            lat: String::new(),
            lng: "104.77".to_owned(),
        };
        assert_eq!(form.validate(), Err(ValidationError::MerchantFieldsMissing));

        let form = MerchantForm {
            lat: "-2.97".to_owned(),
            ..form
        };
        let valid = form.validate().unwrap();
        assert!((valid.lat - -2.97).abs() < f64::EPSILON);
    }

    #[test]
    fn test_item_price_floor() {
        let form = ItemForm {
            name: "Gula Pasir 1kg".to_owned(),
            category: "Sembako".to_owned(),
            price: "500".to_owned(),
            stock: "10".to_owned(),
        };
        assert_eq!(form.validate(), Err(ValidationError::PriceTooLow));

        let form = ItemForm {
            price: "14000".to_owned(),
            stock: String::new(),
            ..form
        };
        let valid = form.validate().unwrap();
        assert_eq!(valid.price, Rupiah::new(14_000));
        assert_eq!(valid.stock, 0);
    }

    #[test]
    fn test_item_rejects_negative_stock() {
        let form = ItemForm {
            name: "Telur".to_owned(),
            category: "Protein".to_owned(),
            price: "27000".to_owned(),
            stock: "-1".to_owned(),
        };
        assert_eq!(form.validate(), Err(ValidationError::InvalidNumber("Stok")));
    }

    #[test]
    fn test_order_needs_address_for_delivery() {
        let form = OrderForm::default();
        assert_eq!(form.validate(10), Err(ValidationError::AddressRequired));

        let pickup = OrderForm {
            delivery_method: DeliveryMethod::Ambil,
            ..OrderForm::default()
        };
        let valid = pickup.validate(10).unwrap();
        assert_eq!(valid.address, None);
        assert_eq!(valid.quantity, 1);
    }

    #[test]
    fn test_order_quantity_within_stock() {
        let form = OrderForm {
            quantity: "11".to_owned(),
            address: "Jl. Sudirman 5".to_owned(),
            ..OrderForm::default()
        };
        assert_eq!(
            form.validate(10),
            Err(ValidationError::QuantityOutOfRange { max: 10 })
        );
    }

    #[test]
    fn test_order_out_of_stock() {
        let form = OrderForm {
            quantity: "1".to_owned(),
            ..OrderForm::default()
        };
        assert_eq!(form.validate(0), Err(ValidationError::OutOfStock));
        assert_eq!(ValidationError::OutOfStock.to_string(), "Stok produk habis");
    }

    #[test]
    fn test_contact_requires_all_fields() {
        let form = ContactForm {
            name: "Sari".to_owned(),
            email: "sari@pasarku.id".to_owned(),
            subject: String::new(),
            message: "Halo".to_owned(),
        };
        assert_eq!(form.validate().err(), Some(ValidationError::Required("Subjek")));
    }
}
