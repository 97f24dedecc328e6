//! Cart domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use bewear_core::{
    AddressId, CartId, CartItemId, CurrencyCode, Money, MoneyError, ProductId, Quantity, UserId,
    VariantId,
};

use super::address::ShippingAddress;

/// A user's cart row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Cart {
    pub id: CartId,
    pub user_id: UserId,
    pub shipping_address_id: Option<AddressId>,
    pub created_at: DateTime<Utc>,
}

/// One cart line joined with its variant and product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartLine {
    pub id: CartItemId,
    pub variant_id: VariantId,
    pub variant_name: String,
    pub variant_slug: String,
    pub color: String,
    pub image_url: Option<String>,
    pub product_id: ProductId,
    pub product_name: String,
    pub unit_price: Money,
    pub quantity: Quantity,
}

impl CartLine {
    /// Unit price multiplied by quantity.
    ///
    /// # Errors
    ///
    /// Returns `MoneyError::Overflow` if the product does not fit in `i64`.
    pub fn line_total(&self) -> Result<Money, MoneyError> {
        self.unit_price.times(self.quantity)
    }
}

/// A cart with its lines and the bound shipping address, if any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartDetails {
    pub cart: Cart,
    pub items: Vec<CartLine>,
    pub shipping_address: Option<ShippingAddress>,
}

impl CartDetails {
    /// Currency of the cart: that of its first line, USD when empty.
    #[must_use]
    pub fn currency(&self) -> CurrencyCode {
        self.items
            .first()
            .map_or_else(CurrencyCode::default, |line| line.unit_price.currency)
    }

    /// Sum of unit price times quantity over every line.
    ///
    /// # Errors
    ///
    /// Returns `MoneyError::Overflow` on overflow and
    /// `MoneyError::CurrencyMismatch` if lines are priced in different currencies.
    pub fn total(&self) -> Result<Money, MoneyError> {
        let lines = self
            .items
            .iter()
            .map(CartLine::line_total)
            .collect::<Result<Vec<_>, _>>()?;
        Money::sum(self.currency(), lines)
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> i64 {
        self.items
            .iter()
            .map(|line| i64::from(line.quantity.get()))
            .sum()
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// A cart line together with the user owning its cart.
///
/// Used to check ownership before mutating a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OwnedCartItem {
    pub id: CartItemId,
    pub cart_id: CartId,
    pub owner_id: UserId,
    pub quantity: Quantity,
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn line(unit_cents: i64, quantity: i32) -> CartLine {
        CartLine {
            id: CartItemId::generate(),
            variant_id: VariantId::generate(),
            variant_name: "Black".to_string(),
            variant_slug: "backpack-black".to_string(),
            color: "Black".to_string(),
            image_url: None,
            product_id: ProductId::generate(),
            product_name: "Backpack".to_string(),
            unit_price: Money::from_cents(unit_cents, CurrencyCode::USD),
            quantity: Quantity::new(quantity).unwrap_or(Quantity::ONE),
        }
    }

    pub fn cart(items: Vec<CartLine>, shipping_address: Option<ShippingAddress>) -> CartDetails {
        let user_id = UserId::generate();
        CartDetails {
            cart: Cart {
                id: CartId::generate(),
                user_id,
                shipping_address_id: shipping_address.as_ref().map(|a| a.id),
                created_at: Utc::now(),
            },
            items,
            shipping_address,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::fixtures::{cart, line};
    use super::*;

    #[test]
    fn test_total_sums_price_times_quantity() {
        let details = cart(vec![line(12_999, 2), line(1999, 3)], None);
        let total = details.total().unwrap();
        assert_eq!(total.cents, 2 * 12_999 + 3 * 1999);
        assert_eq!(total.currency, CurrencyCode::USD);
        assert_eq!(details.item_count(), 5);
    }

    #[test]
    fn test_empty_cart_total_is_zero() {
        let details = cart(Vec::new(), None);
        assert!(details.is_empty());
        assert_eq!(details.total().unwrap(), Money::zero(CurrencyCode::USD));
        assert_eq!(details.item_count(), 0);
    }

    #[test]
    fn test_mixed_currencies_are_rejected() {
        let mut brl = line(5000, 1);
        brl.unit_price = Money::from_cents(5000, CurrencyCode::BRL);
        let details = cart(vec![line(1000, 1), brl], None);
        assert!(matches!(
            details.total(),
            Err(MoneyError::CurrencyMismatch(_, _))
        ));
    }
}
