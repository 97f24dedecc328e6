//! Order service.
//!
//! Completing an order reads the cart, writes the order and its items, and
//! clears the cart in a single transaction. Any failure rolls back all of it.

use sqlx::PgPool;
use thiserror::Error;
use tracing::instrument;

use bewear_core::{MoneyError, OrderId, UserId};

use crate::db::{OrderRepository, RepositoryError, carts, orders};
use crate::models::order::{DraftError, Order, OrderDraft, OrderWithItems};

/// Errors from order operations.
#[derive(Debug, Error)]
pub enum OrderError {
    /// The user has no cart.
    #[error("cart not found")]
    CartNotFound,

    /// The cart has no lines.
    #[error("cart is empty")]
    EmptyCart,

    /// No shipping address is bound to the cart.
    #[error("shipping address not found")]
    MissingShippingAddress,

    /// The order total could not be computed.
    #[error("order total: {0}")]
    Total(#[from] MoneyError),

    /// The order does not exist or belongs to another user.
    #[error("order not found")]
    NotFound,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

impl From<DraftError> for OrderError {
    fn from(err: DraftError) -> Self {
        match err {
            DraftError::EmptyCart => Self::EmptyCart,
            DraftError::MissingShippingAddress => Self::MissingShippingAddress,
            DraftError::Total(e) => Self::Total(e),
        }
    }
}

impl From<sqlx::Error> for OrderError {
    fn from(err: sqlx::Error) -> Self {
        Self::Repository(RepositoryError::Database(err))
    }
}

/// Order service.
pub struct OrderService<'a> {
    pool: &'a PgPool,
    orders: OrderRepository<'a>,
}

impl<'a> OrderService<'a> {
    /// Create a new order service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            pool,
            orders: OrderRepository::new(pool),
        }
    }

    /// Turn the user's cart into an order.
    ///
    /// The cart row stays locked until commit, so concurrent checkouts of the
    /// same cart run one after the other and the second sees an empty cart.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::CartNotFound` if the user has no cart.
    /// Returns `OrderError::EmptyCart` if the cart has no lines.
    /// Returns `OrderError::MissingShippingAddress` if no address is bound.
    /// Returns `OrderError::Total` if the total overflows.
    /// Returns `OrderError::Repository` if a database operation fails.
    #[instrument(skip(self))]
    pub async fn complete_order(&self, user_id: UserId) -> Result<Order, OrderError> {
        let mut tx = self.pool.begin().await?;

        let cart = carts::load_details(&mut *tx, user_id, true)
            .await?
            .ok_or(OrderError::CartNotFound)?;

        let draft = OrderDraft::from_cart(&cart)?;
        let order = orders::insert_from_draft(&mut *tx, &draft).await?;
        let cleared = carts::clear_items(&mut *tx, cart.cart.id).await?;

        tx.commit().await?;

        tracing::info!(
            order_id = %order.id,
            items = cleared,
            total = %order.total,
            "Order completed"
        );
        Ok(order)
    }

    /// The user's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::Repository` if the query fails.
    #[instrument(skip(self))]
    pub async fn list_orders(&self, user_id: UserId) -> Result<Vec<Order>, OrderError> {
        Ok(self.orders.list_for_user(user_id).await?)
    }

    /// One of the user's orders with its items.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::NotFound` if the order doesn't exist or belongs to
    /// another user.
    /// Returns `OrderError::Repository` if a query fails.
    #[instrument(skip(self))]
    pub async fn get_order(
        &self,
        user_id: UserId,
        order_id: OrderId,
    ) -> Result<OrderWithItems, OrderError> {
        self.orders
            .get_for_user(user_id, order_id)
            .await?
            .ok_or(OrderError::NotFound)
    }
}
