//! Order repository.

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use bewear_core::{
    AddressId, Money, OrderId, OrderItemId, OrderStatus, Quantity, UserId, VariantId,
};

use super::RepositoryError;
use super::catalog::parse_currency;
use crate::models::address::AddressDetails;
use crate::models::order::{Order, OrderDraft, OrderItem, OrderWithItems};

const ORDER_COLUMNS: &str = "id, user_id, shipping_address_id, recipient_name, street, number, \
     complement, city, state, neighborhood, zip_code, country, phone, email, document, \
     total_price_in_cents, currency, status::text AS status, created_at";

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: Uuid,
    user_id: Uuid,
    shipping_address_id: Option<Uuid>,
    recipient_name: String,
    street: String,
    number: String,
    complement: Option<String>,
    city: String,
    state: String,
    neighborhood: String,
    zip_code: String,
    country: String,
    phone: String,
    email: String,
    document: String,
    total_price_in_cents: i64,
    currency: String,
    status: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
    type Error = RepositoryError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        let currency = parse_currency(&row.currency)?;
        let status = row
            .status
            .parse::<OrderStatus>()
            .map_err(RepositoryError::DataCorruption)?;

        Ok(Self {
            id: OrderId::new(row.id),
            user_id: UserId::new(row.user_id),
            shipping_address_id: row.shipping_address_id.map(AddressId::new),
            shipping: AddressDetails {
                recipient_name: row.recipient_name,
                phone: row.phone,
                email: row.email,
                document: row.document,
                street: row.street,
                number: row.number,
                complement: row.complement,
                neighborhood: row.neighborhood,
                city: row.city,
                state: row.state,
                zip_code: row.zip_code,
                country: row.country,
            },
            total: Money::from_cents(row.total_price_in_cents, currency),
            status,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct OrderItemRow {
    id: Uuid,
    order_id: Uuid,
    variant_id: Uuid,
    variant_name: String,
    product_name: String,
    image_url: Option<String>,
    quantity: i32,
    price_in_cents: i32,
    currency: String,
}

impl TryFrom<OrderItemRow> for OrderItem {
    type Error = RepositoryError;

    fn try_from(row: OrderItemRow) -> Result<Self, Self::Error> {
        let currency = parse_currency(&row.currency)?;
        let quantity = Quantity::new(row.quantity)
            .map_err(|e| RepositoryError::DataCorruption(format!("invalid order quantity: {e}")))?;

        Ok(Self {
            id: OrderItemId::new(row.id),
            order_id: OrderId::new(row.order_id),
            variant_id: VariantId::new(row.variant_id),
            variant_name: row.variant_name,
            product_name: row.product_name,
            image_url: row.image_url,
            quantity,
            unit_price: Money::from_cents(i64::from(row.price_in_cents), currency),
        })
    }
}

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List a user's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Order>, RepositoryError> {
        sqlx::query_as::<_, OrderRow>(&format!(
            r#"
            SELECT {ORDER_COLUMNS}
            FROM storefront."order"
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#
        ))
        .bind(user_id)
        .fetch_all(self.pool)
        .await?
        .into_iter()
        .map(Order::try_from)
        .collect()
    }

    /// Get one of a user's orders with its items.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get_for_user(
        &self,
        user_id: UserId,
        order_id: OrderId,
    ) -> Result<Option<OrderWithItems>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            r#"
            SELECT {ORDER_COLUMNS}
            FROM storefront."order"
            WHERE id = $1 AND user_id = $2
            "#
        ))
        .bind(order_id)
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;

        let Some(order) = row.map(Order::try_from).transpose()? else {
            return Ok(None);
        };

        let items = sqlx::query_as::<_, OrderItemRow>(
            r"
            SELECT oi.id, oi.order_id, v.id AS variant_id, v.name AS variant_name,
                   p.name AS product_name, v.image_urls[1] AS image_url,
                   oi.quantity, oi.price_in_cents, oi.currency
            FROM storefront.order_item oi
            JOIN storefront.product_variant v ON v.id = oi.product_variant_id
            JOIN storefront.product p ON p.id = v.product_id
            WHERE oi.order_id = $1
            ORDER BY oi.created_at, oi.id
            ",
        )
        .bind(order.id)
        .fetch_all(self.pool)
        .await?
        .into_iter()
        .map(OrderItem::try_from)
        .collect::<Result<Vec<_>, _>>()?;

        Ok(Some(OrderWithItems { order, items }))
    }
}

/// Write an order and its items from a draft on an existing connection.
///
/// Callers run this inside the transaction that read the cart.
///
/// # Errors
///
/// Returns `RepositoryError::DataCorruption` if a unit price does not fit the
/// `price_in_cents` column.
/// Returns `RepositoryError::Database` if an insert fails.
pub async fn insert_from_draft(
    conn: &mut PgConnection,
    draft: &OrderDraft,
) -> Result<Order, RepositoryError> {
    let shipping = &draft.shipping;
    let row = sqlx::query_as::<_, OrderRow>(&format!(
        r#"
        INSERT INTO storefront."order" (
            user_id, shipping_address_id, recipient_name, street, number, complement,
            city, state, neighborhood, zip_code, country, phone, email, document,
            total_price_in_cents, currency
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
        RETURNING {ORDER_COLUMNS}
        "#
    ))
    .bind(draft.user_id)
    .bind(draft.shipping_address_id)
    .bind(&shipping.recipient_name)
    .bind(&shipping.street)
    .bind(&shipping.number)
    .bind(shipping.complement.as_deref())
    .bind(&shipping.city)
    .bind(&shipping.state)
    .bind(&shipping.neighborhood)
    .bind(&shipping.zip_code)
    .bind(&shipping.country)
    .bind(&shipping.phone)
    .bind(&shipping.email)
    .bind(&shipping.document)
    .bind(draft.total.cents)
    .bind(draft.total.currency.as_str())
    .fetch_one(&mut *conn)
    .await?;

    let order = Order::try_from(row)?;

    for item in &draft.items {
        let price_in_cents = i32::try_from(item.unit_price.cents).map_err(|_| {
            RepositoryError::DataCorruption(format!(
                "unit price {} out of range for variant {}",
                item.unit_price.cents, item.variant_id
            ))
        })?;

        sqlx::query(
            r"
            INSERT INTO storefront.order_item (
                order_id, product_variant_id, quantity, price_in_cents, currency
            )
            VALUES ($1, $2, $3, $4, $5)
            ",
        )
        .bind(order.id)
        .bind(item.variant_id)
        .bind(item.quantity.get())
        .bind(price_in_cents)
        .bind(item.unit_price.currency.as_str())
        .execute(&mut *conn)
        .await?;
    }

    Ok(order)
}
