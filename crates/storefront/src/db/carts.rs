//! Cart repository.
//!
//! Each user has at most one cart (`UNIQUE (user_id)`), and each variant
//! appears at most once per cart (`UNIQUE (cart_id, product_variant_id)`).
//! Both are written with `INSERT ... ON CONFLICT` so concurrent requests
//! cannot create duplicates.

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use bewear_core::{
    AddressId, CartId, CartItemId, Money, ProductId, Quantity, UserId, VariantId,
};

use super::RepositoryError;
use super::addresses::{ADDRESS_COLUMNS, AddressRow};
use super::catalog::parse_currency;
use crate::models::address::ShippingAddress;
use crate::models::cart::{Cart, CartDetails, CartLine, OwnedCartItem};

#[derive(Debug, sqlx::FromRow)]
struct CartRow {
    id: Uuid,
    user_id: Uuid,
    shipping_address_id: Option<Uuid>,
    created_at: DateTime<Utc>,
}

impl From<CartRow> for Cart {
    fn from(row: CartRow) -> Self {
        Self {
            id: CartId::new(row.id),
            user_id: UserId::new(row.user_id),
            shipping_address_id: row.shipping_address_id.map(AddressId::new),
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CartLineRow {
    id: Uuid,
    quantity: i32,
    variant_id: Uuid,
    variant_name: String,
    variant_slug: String,
    color: String,
    image_url: Option<String>,
    price_in_cents: i32,
    currency: String,
    product_id: Uuid,
    product_name: String,
}

impl TryFrom<CartLineRow> for CartLine {
    type Error = RepositoryError;

    fn try_from(row: CartLineRow) -> Result<Self, Self::Error> {
        let currency = parse_currency(&row.currency)?;
        let quantity = parse_quantity(row.quantity)?;

        Ok(Self {
            id: CartItemId::new(row.id),
            variant_id: VariantId::new(row.variant_id),
            variant_name: row.variant_name,
            variant_slug: row.variant_slug,
            color: row.color,
            image_url: row.image_url,
            product_id: ProductId::new(row.product_id),
            product_name: row.product_name,
            unit_price: Money::from_cents(i64::from(row.price_in_cents), currency),
            quantity,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct OwnedItemRow {
    id: Uuid,
    cart_id: Uuid,
    owner_id: Uuid,
    quantity: i32,
}

fn parse_quantity(raw: i32) -> Result<Quantity, RepositoryError> {
    Quantity::new(raw)
        .map_err(|e| RepositoryError::DataCorruption(format!("invalid cart quantity: {e}")))
}

/// Repository for cart database operations.
pub struct CartRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CartRepository<'a> {
    /// Create a new cart repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a user's cart, if they have one.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_user(&self, user_id: UserId) -> Result<Option<Cart>, RepositoryError> {
        let row = sqlx::query_as::<_, CartRow>(
            r"
            SELECT id, user_id, shipping_address_id, created_at
            FROM storefront.cart
            WHERE user_id = $1
            ",
        )
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Cart::from))
    }

    /// Get a user's cart, creating an empty one if needed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_or_create(&self, user_id: UserId) -> Result<Cart, RepositoryError> {
        // The no-op update makes RETURNING yield the existing row on conflict.
        let row = sqlx::query_as::<_, CartRow>(
            r"
            INSERT INTO storefront.cart (user_id)
            VALUES ($1)
            ON CONFLICT (user_id) DO UPDATE SET user_id = EXCLUDED.user_id
            RETURNING id, user_id, shipping_address_id, created_at
            ",
        )
        .bind(user_id)
        .fetch_one(self.pool)
        .await?;

        Ok(Cart::from(row))
    }

    /// Add `quantity` units of a variant to a cart.
    ///
    /// If the variant is already in the cart its quantity is incremented;
    /// otherwise a new line is created. Returns the line ID and its new quantity,
    /// or `None` when the merged quantity would not fit in the `quantity` column.
    /// The existing line is left unchanged in that case.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails (including a
    /// missing variant, which violates the foreign key).
    pub async fn add_item(
        &self,
        cart_id: CartId,
        variant_id: VariantId,
        quantity: Quantity,
    ) -> Result<Option<(CartItemId, Quantity)>, RepositoryError> {
        // The sum is compared as bigint so it cannot raise 22003 in int4.
        let row: Option<(Uuid, i32)> = sqlx::query_as(
            r"
            INSERT INTO storefront.cart_item (cart_id, product_variant_id, quantity)
            VALUES ($1, $2, $3)
            ON CONFLICT (cart_id, product_variant_id)
                DO UPDATE SET quantity = storefront.cart_item.quantity + EXCLUDED.quantity
                WHERE storefront.cart_item.quantity::bigint + EXCLUDED.quantity <= $4
            RETURNING id, quantity
            ",
        )
        .bind(cart_id)
        .bind(variant_id)
        .bind(quantity.get())
        .bind(i64::from(i32::MAX))
        .fetch_optional(self.pool)
        .await?;

        row.map(|(id, new_quantity)| Ok((CartItemId::new(id), parse_quantity(new_quantity)?)))
            .transpose()
    }

    /// Get a cart line together with the user who owns its cart.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_item_with_owner(
        &self,
        item_id: CartItemId,
    ) -> Result<Option<OwnedCartItem>, RepositoryError> {
        let row = sqlx::query_as::<_, OwnedItemRow>(
            r"
            SELECT ci.id, ci.cart_id, c.user_id AS owner_id, ci.quantity
            FROM storefront.cart_item ci
            JOIN storefront.cart c ON c.id = ci.cart_id
            WHERE ci.id = $1
            ",
        )
        .bind(item_id)
        .fetch_optional(self.pool)
        .await?;

        row.map(|r| {
            Ok(OwnedCartItem {
                id: CartItemId::new(r.id),
                cart_id: CartId::new(r.cart_id),
                owner_id: UserId::new(r.owner_id),
                quantity: parse_quantity(r.quantity)?,
            })
        })
        .transpose()
    }

    /// Set the quantity of a cart line.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the line doesn't exist.
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn set_item_quantity(
        &self,
        item_id: CartItemId,
        quantity: Quantity,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE storefront.cart_item SET quantity = $2 WHERE id = $1")
            .bind(item_id)
            .bind(quantity.get())
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Delete a cart line.
    ///
    /// # Returns
    ///
    /// Returns `true` if the line was deleted, `false` if it didn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete_item(&self, item_id: CartItemId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM storefront.cart_item WHERE id = $1")
            .bind(item_id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Bind a shipping address to a cart.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the cart doesn't exist.
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn set_shipping_address(
        &self,
        cart_id: CartId,
        address_id: AddressId,
    ) -> Result<(), RepositoryError> {
        let result =
            sqlx::query("UPDATE storefront.cart SET shipping_address_id = $2 WHERE id = $1")
                .bind(cart_id)
                .bind(address_id)
                .execute(self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Get a user's cart with its lines and bound shipping address.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored line is invalid.
    pub async fn get_details(
        &self,
        user_id: UserId,
    ) -> Result<Option<CartDetails>, RepositoryError> {
        let mut conn = self.pool.acquire().await?;
        load_details(&mut conn, user_id, false).await
    }
}

/// Load a user's cart with lines and address on an existing connection.
///
/// With `lock` set, the cart row is locked `FOR UPDATE` until the enclosing
/// transaction ends, so two checkouts of the same cart are serialized.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if a query fails.
/// Returns `RepositoryError::DataCorruption` if a stored line is invalid.
pub async fn load_details(
    conn: &mut PgConnection,
    user_id: UserId,
    lock: bool,
) -> Result<Option<CartDetails>, RepositoryError> {
    let lock_clause = if lock { "FOR UPDATE" } else { "" };
    let cart = sqlx::query_as::<_, CartRow>(&format!(
        r"
        SELECT id, user_id, shipping_address_id, created_at
        FROM storefront.cart
        WHERE user_id = $1
        {lock_clause}
        "
    ))
    .bind(user_id)
    .fetch_optional(&mut *conn)
    .await?;

    let Some(cart) = cart.map(Cart::from) else {
        return Ok(None);
    };

    let items = sqlx::query_as::<_, CartLineRow>(
        r"
        SELECT ci.id, ci.quantity,
               v.id AS variant_id, v.name AS variant_name, v.slug AS variant_slug,
               v.color, v.image_urls[1] AS image_url, v.price_in_cents, v.currency,
               p.id AS product_id, p.name AS product_name
        FROM storefront.cart_item ci
        JOIN storefront.product_variant v ON v.id = ci.product_variant_id
        JOIN storefront.product p ON p.id = v.product_id
        WHERE ci.cart_id = $1
        ORDER BY ci.created_at, ci.id
        ",
    )
    .bind(cart.id)
    .fetch_all(&mut *conn)
    .await?
    .into_iter()
    .map(CartLine::try_from)
    .collect::<Result<Vec<_>, _>>()?;

    let shipping_address = match cart.shipping_address_id {
        Some(address_id) => sqlx::query_as::<_, AddressRow>(&format!(
            "SELECT {ADDRESS_COLUMNS} FROM storefront.shipping_address WHERE id = $1"
        ))
        .bind(address_id)
        .fetch_optional(&mut *conn)
        .await?
        .map(ShippingAddress::from),
        None => None,
    };

    Ok(Some(CartDetails {
        cart,
        items,
        shipping_address,
    }))
}

/// Delete every line of a cart.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn clear_items(conn: &mut PgConnection, cart_id: CartId) -> Result<u64, RepositoryError> {
    let result = sqlx::query("DELETE FROM storefront.cart_item WHERE cart_id = $1")
        .bind(cart_id)
        .execute(&mut *conn)
        .await?;

    Ok(result.rows_affected())
}
