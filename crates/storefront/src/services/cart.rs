//! Cart service.
//!
//! Every operation acts on the signed-in user's own cart; lines and
//! addresses belonging to other users are rejected.

use sqlx::PgPool;
use thiserror::Error;
use tracing::instrument;

use bewear_core::{AddressId, CartItemId, Quantity, QuantityError, UserId, VariantId};

use crate::db::{AddressRepository, CartRepository, CatalogRepository, RepositoryError};
use crate::models::cart::{CartDetails, OwnedCartItem};

/// Errors from cart operations.
#[derive(Debug, Error)]
pub enum CartError {
    /// The product variant does not exist.
    #[error("product variant not found")]
    VariantNotFound,

    /// The cart line does not exist.
    #[error("item not found in cart")]
    ItemNotFound,

    /// The cart line belongs to another user's cart.
    #[error("cart item belongs to another user")]
    Forbidden,

    /// The address does not exist or belongs to another user.
    #[error("shipping address not found")]
    AddressNotFound,

    /// The user has no cart yet.
    #[error("cart not found")]
    CartNotFound,

    /// Quantity below one.
    #[error(transparent)]
    InvalidQuantity(#[from] QuantityError),

    /// Adding would push the line past the largest storable quantity.
    #[error("cart line cannot hold more than {} units", i32::MAX)]
    QuantityTooLarge,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Outcome of decreasing a line's quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decrease {
    /// The line now has this quantity.
    Decremented(Quantity),
    /// The line had quantity one and was removed.
    Removed,
}

/// Cart service.
pub struct CartService<'a> {
    carts: CartRepository<'a>,
    catalog: CatalogRepository<'a>,
    addresses: AddressRepository<'a>,
}

impl<'a> CartService<'a> {
    /// Create a new cart service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            carts: CartRepository::new(pool),
            catalog: CatalogRepository::new(pool),
            addresses: AddressRepository::new(pool),
        }
    }

    /// Get the user's cart with lines and address, creating an empty cart
    /// if they have none.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Repository` if the database operation fails.
    #[instrument(skip(self))]
    pub async fn get_cart(&self, user_id: UserId) -> Result<CartDetails, CartError> {
        if let Some(details) = self.carts.get_details(user_id).await? {
            return Ok(details);
        }

        self.carts.get_or_create(user_id).await?;
        self.carts
            .get_details(user_id)
            .await?
            .ok_or(CartError::CartNotFound)
    }

    /// Add `quantity` units of a variant to the user's cart.
    ///
    /// The cart is created on demand. Adding a variant that is already in
    /// the cart increments that line's quantity.
    ///
    /// # Errors
    ///
    /// Returns `CartError::VariantNotFound` if the variant doesn't exist.
    /// Returns `CartError::QuantityTooLarge` if the merged line quantity would overflow.
    /// Returns `CartError::Repository` if the database operation fails.
    #[instrument(skip(self))]
    pub async fn add_product(
        &self,
        user_id: UserId,
        variant_id: VariantId,
        quantity: Quantity,
    ) -> Result<(CartItemId, Quantity), CartError> {
        if self.catalog.get_variant(variant_id).await?.is_none() {
            return Err(CartError::VariantNotFound);
        }

        let cart = self.carts.get_or_create(user_id).await?;
        let (item_id, new_quantity) = self
            .carts
            .add_item(cart.id, variant_id, quantity)
            .await?
            .ok_or(CartError::QuantityTooLarge)?;

        tracing::info!(%item_id, quantity = new_quantity.get(), "Added product to cart");
        Ok((item_id, new_quantity))
    }

    /// Decrease a line's quantity by one, removing it at quantity one.
    ///
    /// # Errors
    ///
    /// Returns `CartError::ItemNotFound` if the line doesn't exist.
    /// Returns `CartError::Forbidden` if the line is in another user's cart.
    /// Returns `CartError::Repository` if the database operation fails.
    #[instrument(skip(self))]
    pub async fn decrease_quantity(
        &self,
        user_id: UserId,
        item_id: CartItemId,
    ) -> Result<Decrease, CartError> {
        let item = self.owned_item(user_id, item_id).await?;

        match item.quantity.decremented() {
            Some(quantity) => {
                self.carts.set_item_quantity(item.id, quantity).await?;
                Ok(Decrease::Decremented(quantity))
            }
            None => {
                self.carts.delete_item(item.id).await?;
                Ok(Decrease::Removed)
            }
        }
    }

    /// Remove a line from the user's cart.
    ///
    /// # Errors
    ///
    /// Returns `CartError::ItemNotFound` if the line doesn't exist.
    /// Returns `CartError::Forbidden` if the line is in another user's cart.
    /// Returns `CartError::Repository` if the database operation fails.
    #[instrument(skip(self))]
    pub async fn remove_item(&self, user_id: UserId, item_id: CartItemId) -> Result<(), CartError> {
        let item = self.owned_item(user_id, item_id).await?;

        if !self.carts.delete_item(item.id).await? {
            return Err(CartError::ItemNotFound);
        }
        Ok(())
    }

    /// Bind one of the user's saved addresses to their cart.
    ///
    /// # Errors
    ///
    /// Returns `CartError::AddressNotFound` if the address doesn't exist or
    /// belongs to another user.
    /// Returns `CartError::CartNotFound` if the user has no cart.
    /// Returns `CartError::Repository` if the database operation fails.
    #[instrument(skip(self))]
    pub async fn set_shipping_address(
        &self,
        user_id: UserId,
        address_id: AddressId,
    ) -> Result<(), CartError> {
        if self
            .addresses
            .get_for_user(user_id, address_id)
            .await?
            .is_none()
        {
            return Err(CartError::AddressNotFound);
        }

        let cart = self
            .carts
            .get_by_user(user_id)
            .await?
            .ok_or(CartError::CartNotFound)?;

        self.carts
            .set_shipping_address(cart.id, address_id)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => CartError::CartNotFound,
                other => CartError::Repository(other),
            })
    }

    /// Load a line and check that it is in the user's cart.
    async fn owned_item(
        &self,
        user_id: UserId,
        item_id: CartItemId,
    ) -> Result<OwnedCartItem, CartError> {
        let item = self
            .carts
            .get_item_with_owner(item_id)
            .await?
            .ok_or(CartError::ItemNotFound)?;

        check_owner(&item, user_id)?;
        Ok(item)
    }
}

/// Ensure a cart line belongs to `user_id`.
fn check_owner(item: &OwnedCartItem, user_id: UserId) -> Result<(), CartError> {
    if item.owner_id == user_id {
        Ok(())
    } else {
        Err(CartError::Forbidden)
    }
}

#[cfg(test)]
mod tests {
    use bewear_core::CartId;

    use super::*;

    fn item(owner_id: UserId) -> OwnedCartItem {
        OwnedCartItem {
            id: CartItemId::generate(),
            cart_id: CartId::generate(),
            owner_id,
            quantity: Quantity::ONE,
        }
    }

    #[test]
    fn test_check_owner_accepts_own_item() {
        let user = UserId::generate();
        assert!(check_owner(&item(user), user).is_ok());
    }

    #[test]
    fn test_check_owner_rejects_foreign_item() {
        let owner = UserId::generate();
        let intruder = UserId::generate();
        assert!(matches!(
            check_owner(&item(owner), intruder),
            Err(CartError::Forbidden)
        ));
    }
}
