//! Shipping address repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use bewear_core::{AddressId, UserId};

use super::RepositoryError;
use crate::models::address::{AddressDetails, NewShippingAddress, ShippingAddress};

pub(super) const ADDRESS_COLUMNS: &str = "id, user_id, recipient_name, phone, email, document, street, number, \
     complement, neighborhood, city, state, zip_code, country, created_at";

#[derive(Debug, sqlx::FromRow)]
pub(super) struct AddressRow {
    id: Uuid,
    user_id: Uuid,
    recipient_name: String,
    phone: String,
    email: String,
    document: String,
    street: String,
    number: String,
    complement: Option<String>,
    neighborhood: String,
    city: String,
    state: String,
    zip_code: String,
    country: String,
    created_at: DateTime<Utc>,
}

impl From<AddressRow> for ShippingAddress {
    fn from(row: AddressRow) -> Self {
        Self {
            id: AddressId::new(row.id),
            user_id: UserId::new(row.user_id),
            details: AddressDetails {
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
            created_at: row.created_at,
        }
    }
}

/// Repository for shipping address database operations.
pub struct AddressRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AddressRepository<'a> {
    /// Create a new address repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List a user's addresses, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<ShippingAddress>, RepositoryError> {
        let rows = sqlx::query_as::<_, AddressRow>(&format!(
            r"
            SELECT {ADDRESS_COLUMNS}
            FROM storefront.shipping_address
            WHERE user_id = $1
            ORDER BY created_at
            "
        ))
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(ShippingAddress::from).collect())
    }

    /// Get an address if it belongs to `user_id`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_for_user(
        &self,
        user_id: UserId,
        id: AddressId,
    ) -> Result<Option<ShippingAddress>, RepositoryError> {
        let row = sqlx::query_as::<_, AddressRow>(&format!(
            r"
            SELECT {ADDRESS_COLUMNS}
            FROM storefront.shipping_address
            WHERE id = $1 AND user_id = $2
            "
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(ShippingAddress::from))
    }

    /// Insert a validated address for `user_id`.
    ///
    /// The `document` column is stored empty.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(
        &self,
        user_id: UserId,
        address: &NewShippingAddress,
    ) -> Result<ShippingAddress, RepositoryError> {
        let row = sqlx::query_as::<_, AddressRow>(&format!(
            r"
            INSERT INTO storefront.shipping_address (
                user_id, recipient_name, phone, email, document, street, number,
                complement, neighborhood, city, state, zip_code, country
            )
            VALUES ($1, $2, $3, $4, '', $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING {ADDRESS_COLUMNS}
            "
        ))
        .bind(user_id)
        .bind(&address.recipient_name)
        .bind(&address.phone)
        .bind(address.email.as_str())
        .bind(&address.street)
        .bind(&address.number)
        .bind(address.complement.as_deref())
        .bind(&address.neighborhood)
        .bind(&address.city)
        .bind(&address.state)
        .bind(&address.zip_code)
        .bind(address.country.display_name())
        .fetch_one(self.pool)
        .await?;

        Ok(ShippingAddress::from(row))
    }
}
