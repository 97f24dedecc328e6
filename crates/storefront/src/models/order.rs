//! Order domain types and the cart-to-order draft.

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use bewear_core::{
    AddressId, Money, MoneyError, OrderId, OrderItemId, OrderStatus, Quantity, UserId, VariantId,
};

use super::address::AddressDetails;
use super::cart::CartDetails;

/// Reasons a cart cannot be turned into an order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DraftError {
    /// The cart has no lines.
    #[error("cart is empty")]
    EmptyCart,
    /// No shipping address is bound to the cart.
    #[error("shipping address not found")]
    MissingShippingAddress,
    /// The total could not be computed.
    #[error("order total: {0}")]
    Total(#[from] MoneyError),
}

/// One line of an order about to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderDraftItem {
    pub variant_id: VariantId,
    pub quantity: Quantity,
    /// Unit price captured at purchase time.
    pub unit_price: Money,
}

/// The order payload computed from a cart, before anything is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderDraft {
    pub user_id: UserId,
    pub shipping_address_id: AddressId,
    pub shipping: AddressDetails,
    pub total: Money,
    pub items: Vec<OrderDraftItem>,
}

impl OrderDraft {
    /// Build the order payload for a cart.
    ///
    /// The total is the sum of unit price times quantity over all lines, and
    /// each line becomes one order item at its current unit price.
    ///
    /// # Errors
    ///
    /// Returns `DraftError::EmptyCart` if the cart has no lines,
    /// `DraftError::MissingShippingAddress` if no address is bound and
    /// `DraftError::Total` if the total overflows or mixes currencies.
    pub fn from_cart(cart: &CartDetails) -> Result<Self, DraftError> {
        if cart.is_empty() {
            return Err(DraftError::EmptyCart);
        }

        let address = cart
            .shipping_address
            .as_ref()
            .ok_or(DraftError::MissingShippingAddress)?;

        let total = cart.total()?;

        let items = cart
            .items
            .iter()
            .map(|line| OrderDraftItem {
                variant_id: line.variant_id,
                quantity: line.quantity,
                unit_price: line.unit_price,
            })
            .collect();

        Ok(Self {
            user_id: cart.cart.user_id,
            shipping_address_id: address.id,
            shipping: address.details.clone(),
            total,
            items,
        })
    }
}

/// A placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub shipping_address_id: Option<AddressId>,
    pub shipping: AddressDetails,
    pub total: Money,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

/// A line of a placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub order_id: OrderId,
    pub variant_id: VariantId,
    pub variant_name: String,
    pub product_name: String,
    pub image_url: Option<String>,
    pub quantity: Quantity,
    pub unit_price: Money,
}

/// An order with its lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderWithItems {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use bewear_core::CurrencyCode;

    use super::*;
    use crate::models::address::fixtures::address;
    use crate::models::cart::fixtures::{cart, line};

    #[test]
    fn test_draft_mirrors_cart_lines() {
        let lines = vec![line(12_999, 2), line(1999, 1)];
        let mut details = cart(lines.clone(), None);
        let addr = address(details.cart.user_id);
        details.cart.shipping_address_id = Some(addr.id);
        details.shipping_address = Some(addr.clone());

        let draft = OrderDraft::from_cart(&details).unwrap();

        assert_eq!(draft.user_id, details.cart.user_id);
        assert_eq!(draft.shipping_address_id, addr.id);
        assert_eq!(draft.shipping, addr.details);
        assert_eq!(
            draft.total,
            Money::from_cents(2 * 12_999 + 1999, CurrencyCode::USD)
        );
        assert_eq!(draft.items.len(), 2);
        for (item, line) in draft.items.iter().zip(&lines) {
            assert_eq!(item.variant_id, line.variant_id);
            assert_eq!(item.quantity, line.quantity);
            assert_eq!(item.unit_price, line.unit_price);
        }
    }

    #[test]
    fn test_empty_cart_is_rejected() {
        let mut details = cart(Vec::new(), None);
        details.shipping_address = Some(address(details.cart.user_id));
        assert_eq!(OrderDraft::from_cart(&details), Err(DraftError::EmptyCart));
    }

    #[test]
    fn test_missing_address_is_rejected() {
        let details = cart(vec![line(1000, 1)], None);
        assert_eq!(
            OrderDraft::from_cart(&details),
            Err(DraftError::MissingShippingAddress)
        );
    }

    #[test]
    fn test_overflowing_total_is_rejected() {
        let mut details = cart(vec![line(i64::MAX, 2)], None);
        details.shipping_address = Some(address(details.cart.user_id));
        assert_eq!(
            OrderDraft::from_cart(&details),
            Err(DraftError::Total(MoneyError::Overflow))
        );
    }
}
