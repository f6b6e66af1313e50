//! Checkout selection and totals.

use crate::types::{PaymentOption, Rupiah, ShippingOption};
use crate::validation::ValidationError;

/// Raw checkout input as submitted from the payment page.
#[derive(Debug, Clone, Default)]
pub struct CheckoutForm {
    pub payment_id: Option<u8>,
    pub shipping_id: Option<u8>,
    pub address: String,
    pub has_proof: bool,
    pub line_count: usize,
}

/// A validated checkout choice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutSelection {
    pub payment: &'static PaymentOption,
    pub shipping: &'static ShippingOption,
    /// Trimmed address, present only when the shipping option needs one.
    pub address: Option<String>,
}

impl CheckoutForm {
    /// Validate the form in the order the page reports problems.
    ///
    /// # Errors
    ///
    /// - [`ValidationError::EmptyCart`] when there is nothing to order
    /// - [`ValidationError::MethodsNotSelected`] when payment or shipping is missing
    /// - [`ValidationError::AddressRequired`] when delivery needs an address
    /// - [`ValidationError::ProofRequired`] when a transfer has no proof attached
    pub fn validate(&self) -> Result<CheckoutSelection, ValidationError> {
        if self.line_count == 0 {
            return Err(ValidationError::EmptyCart);
        }

        let payment = self.payment_id.and_then(PaymentOption::by_id);
        let shipping = self.shipping_id.and_then(ShippingOption::by_id);
        let (Some(payment), Some(shipping)) = (payment, shipping) else {
            return Err(ValidationError::MethodsNotSelected);
        };

        let address = self.address.trim();
        if shipping.requires_address() && address.is_empty() {
            return Err(ValidationError::AddressRequired);
        }
        if payment.requires_proof() && !self.has_proof {
            return Err(ValidationError::ProofRequired);
        }

        Ok(CheckoutSelection {
            payment,
            shipping,
            address: shipping
                .requires_address()
                .then(|| address.to_owned()),
        })
    }
}

/// Amounts shown in the payment summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CheckoutTotals {
    pub subtotal: Rupiah,
    pub shipping_cost: Rupiah,
    pub payment_fee: Rupiah,
    pub grand_total: Rupiah,
}

impl CheckoutTotals {
    /// `subtotal + shipping cost + payment fee`; unselected options cost nothing.
    #[must_use]
    pub fn compute(
        subtotal: Rupiah,
        shipping: Option<&ShippingOption>,
        payment: Option<&PaymentOption>,
    ) -> Self {
        let shipping_cost = shipping.map_or(Rupiah::ZERO, |s| s.cost);
        let payment_fee = payment.map_or(Rupiah::ZERO, |p| p.fee);
        Self {
            subtotal,
            shipping_cost,
            payment_fee,
            grand_total: subtotal + shipping_cost + payment_fee,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn form(payment: Option<u8>, shipping: Option<u8>, address: &str, proof: bool) -> CheckoutForm {
        CheckoutForm {
            payment_id: payment,
            shipping_id: shipping,
            address: address.to_owned(),
            has_proof: proof,
            line_count: 2,
        }
    }

    #[test]
    fn test_requires_both_methods() {
        assert_eq!(
            form(None, Some(1), "", false).validate(),
            Err(ValidationError::MethodsNotSelected)
        );
        assert_eq!(
            form(Some(2), None, "", false).validate(),
            Err(ValidationError::MethodsNotSelected)
        );
        assert_eq!(
            form(Some(7), Some(1), "", false).validate(),
            Err(ValidationError::MethodsNotSelected)
        );
    }

    #[test]
    fn test_delivery_requires_address() {
        assert_eq!(
            form(Some(2), Some(2), "   ", false).validate(),
            Err(ValidationError::AddressRequired)
        );
        let ok = form(Some(2), Some(3), " Jl. Merdeka 1 ", false)
            .validate()
            .unwrap();
        assert_eq!(ok.address.as_deref(), Some("Jl. Merdeka 1"));
    }

    #[test]
    fn test_pickup_drops_address() {
        let ok = form(Some(2), Some(1), "ignored", false).validate().unwrap();
        assert_eq!(ok.address, None);
    }

    #[test]
    fn test_transfer_requires_proof() {
        assert_eq!(
            form(Some(1), Some(1), "", false).validate(),
            Err(ValidationError::ProofRequired)
        );
        assert!(form(Some(1), Some(1), "", true).validate().is_ok());
    }

    #[test]
    fn test_empty_cart_is_rejected_first() {
        let empty = CheckoutForm::default();
        assert_eq!(empty.validate(), Err(ValidationError::EmptyCart));
    }

    #[test]
    fn test_grand_total_adds_shipping_and_fee() {
        let totals = CheckoutTotals::compute(
            Rupiah::new(162_000),
            ShippingOption::by_id(3),
            PaymentOption::by_id(2),
        );
        assert_eq!(totals.shipping_cost, Rupiah::new(25_000));
        assert_eq!(totals.grand_total, Rupiah::new(187_000));

        let bare = CheckoutTotals::compute(Rupiah::new(5_000), None, None);
        assert_eq!(bare.grand_total, Rupiah::new(5_000));
    }
}
