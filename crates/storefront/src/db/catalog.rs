//! Catalog repository: categories, products and variants.
//!
//! The catalog is read-only at runtime; it is written by `bw-cli seed`.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use bewear_core::{CategoryId, CurrencyCode, Money, ProductId, VariantId};

use super::{RepositoryError, conflict_on_unique};
use crate::models::catalog::{Category, Product, ProductWithVariants, Variant, group_variants};

const VARIANT_COLUMNS: &str = "id, product_id, name, slug, color, image_urls, price_in_cents, currency, created_at";

#[derive(Debug, sqlx::FromRow)]
struct CategoryRow {
    id: Uuid,
    name: String,
    slug: String,
    created_at: DateTime<Utc>,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Self {
            id: CategoryId::new(row.id),
            name: row.name,
            slug: row.slug,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: Uuid,
    category_id: Uuid,
    name: String,
    slug: String,
    description: String,
    created_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: ProductId::new(row.id),
            category_id: CategoryId::new(row.category_id),
            name: row.name,
            slug: row.slug,
            description: row.description,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct VariantRow {
    id: Uuid,
    product_id: Uuid,
    name: String,
    slug: String,
    color: String,
    image_urls: Vec<String>,
    price_in_cents: i32,
    currency: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<VariantRow> for Variant {
    type Error = RepositoryError;

    fn try_from(row: VariantRow) -> Result<Self, Self::Error> {
        let currency = parse_currency(&row.currency)?;

        Ok(Self {
            id: VariantId::new(row.id),
            product_id: ProductId::new(row.product_id),
            name: row.name,
            slug: row.slug,
            color: row.color,
            image_urls: row.image_urls,
            price: Money::from_cents(i64::from(row.price_in_cents), currency),
            created_at: row.created_at,
        })
    }
}

/// Parse a stored currency code.
pub(super) fn parse_currency(raw: &str) -> Result<CurrencyCode, RepositoryError> {
    raw.parse::<CurrencyCode>()
        .map_err(|e| RepositoryError::DataCorruption(format!("invalid currency in database: {e}")))
}

/// Fields for inserting a category.
#[derive(Debug, Clone)]
pub struct NewCategory<'a> {
    pub name: &'a str,
    pub slug: &'a str,
}

/// Fields for inserting a product.
#[derive(Debug, Clone)]
pub struct NewProduct<'a> {
    pub category_id: CategoryId,
    pub name: &'a str,
    pub slug: &'a str,
    pub description: &'a str,
}

/// Fields for inserting a variant.
#[derive(Debug, Clone)]
pub struct NewVariant<'a> {
    pub product_id: ProductId,
    pub name: &'a str,
    pub slug: &'a str,
    pub color: &'a str,
    pub image_urls: &'a [String],
    pub price_in_cents: i32,
    pub currency: CurrencyCode,
}

/// Repository for catalog database operations.
pub struct CatalogRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CatalogRepository<'a> {
    /// Create a new catalog repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all categories ordered by name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_categories(&self) -> Result<Vec<Category>, RepositoryError> {
        let rows = sqlx::query_as::<_, CategoryRow>(
            "SELECT id, name, slug, created_at FROM storefront.category ORDER BY name",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Category::from).collect())
    }

    /// Get a category by its slug.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_category_by_slug(
        &self,
        slug: &str,
    ) -> Result<Option<Category>, RepositoryError> {
        let row = sqlx::query_as::<_, CategoryRow>(
            "SELECT id, name, slug, created_at FROM storefront.category WHERE slug = $1",
        )
        .bind(slug)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Category::from))
    }

    /// List every product with its variants, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    /// Returns `RepositoryError::DataCorruption` if a variant has an unknown currency.
    pub async fn list_products(&self) -> Result<Vec<ProductWithVariants>, RepositoryError> {
        let products = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, category_id, name, slug, description, created_at
            FROM storefront.product
            ORDER BY created_at, name
            ",
        )
        .fetch_all(self.pool)
        .await?;

        self.with_variants(products).await
    }

    /// List the products in a category with their variants.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    /// Returns `RepositoryError::DataCorruption` if a variant has an unknown currency.
    pub async fn list_products_by_category(
        &self,
        category_id: CategoryId,
    ) -> Result<Vec<ProductWithVariants>, RepositoryError> {
        let products = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, category_id, name, slug, description, created_at
            FROM storefront.product
            WHERE category_id = $1
            ORDER BY created_at, name
            ",
        )
        .bind(category_id)
        .fetch_all(self.pool)
        .await?;

        self.with_variants(products).await
    }

    /// Get a product and all of its variants.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    /// Returns `RepositoryError::DataCorruption` if a variant has an unknown currency.
    pub async fn get_product(
        &self,
        id: ProductId,
    ) -> Result<Option<ProductWithVariants>, RepositoryError> {
        let product = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, category_id, name, slug, description, created_at
            FROM storefront.product
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        let Some(product) = product else {
            return Ok(None);
        };

        Ok(self.with_variants(vec![product]).await?.into_iter().next())
    }

    /// Get a variant by its slug.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the variant has an unknown currency.
    pub async fn get_variant_by_slug(&self, slug: &str) -> Result<Option<Variant>, RepositoryError> {
        let row = sqlx::query_as::<_, VariantRow>(&format!(
            "SELECT {VARIANT_COLUMNS} FROM storefront.product_variant WHERE slug = $1"
        ))
        .bind(slug)
        .fetch_optional(self.pool)
        .await?;

        row.map(Variant::try_from).transpose()
    }

    /// Get a variant by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the variant has an unknown currency.
    pub async fn get_variant(&self, id: VariantId) -> Result<Option<Variant>, RepositoryError> {
        let row = sqlx::query_as::<_, VariantRow>(&format!(
            "SELECT {VARIANT_COLUMNS} FROM storefront.product_variant WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(Variant::try_from).transpose()
    }

    /// Insert a category, or return the existing one with the same slug.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn upsert_category(&self, new: &NewCategory<'_>) -> Result<Category, RepositoryError> {
        let row = sqlx::query_as::<_, CategoryRow>(
            r"
            INSERT INTO storefront.category (name, slug)
            VALUES ($1, $2)
            ON CONFLICT (slug) DO UPDATE SET name = EXCLUDED.name
            RETURNING id, name, slug, created_at
            ",
        )
        .bind(new.name)
        .bind(new.slug)
        .fetch_one(self.pool)
        .await?;

        Ok(Category::from(row))
    }

    /// Insert a product, or update the existing one with the same slug.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn upsert_product(&self, new: &NewProduct<'_>) -> Result<Product, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(
            r"
            INSERT INTO storefront.product (category_id, name, slug, description)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (slug) DO UPDATE
                SET category_id = EXCLUDED.category_id,
                    name = EXCLUDED.name,
                    description = EXCLUDED.description
            RETURNING id, category_id, name, slug, description, created_at
            ",
        )
        .bind(new.category_id)
        .bind(new.name)
        .bind(new.slug)
        .bind(new.description)
        .fetch_one(self.pool)
        .await?;

        Ok(Product::from(row))
    }

    /// Insert a variant, or update the existing one with the same slug.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the slug belongs to another product's variant.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn upsert_variant(&self, new: &NewVariant<'_>) -> Result<Variant, RepositoryError> {
        let row = sqlx::query_as::<_, VariantRow>(&format!(
            r"
            INSERT INTO storefront.product_variant
                (product_id, name, slug, color, image_urls, price_in_cents, currency)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (slug) DO UPDATE
                SET name = EXCLUDED.name,
                    color = EXCLUDED.color,
                    image_urls = EXCLUDED.image_urls,
                    price_in_cents = EXCLUDED.price_in_cents,
                    currency = EXCLUDED.currency
                WHERE storefront.product_variant.product_id = EXCLUDED.product_id
            RETURNING {VARIANT_COLUMNS}
            "
        ))
        .bind(new.product_id)
        .bind(new.name)
        .bind(new.slug)
        .bind(new.color)
        .bind(new.image_urls)
        .bind(new.price_in_cents)
        .bind(new.currency.as_str())
        .fetch_optional(self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, "variant slug"))?
        .ok_or_else(|| RepositoryError::Conflict(format!("variant slug {} is taken", new.slug)))?;

        Variant::try_from(row)
    }

    /// Load variants for `products` and group them.
    async fn with_variants(
        &self,
        products: Vec<ProductRow>,
    ) -> Result<Vec<ProductWithVariants>, RepositoryError> {
        let ids: Vec<Uuid> = products.iter().map(|p| p.id).collect();

        let variants = sqlx::query_as::<_, VariantRow>(&format!(
            r"
            SELECT {VARIANT_COLUMNS}
            FROM storefront.product_variant
            WHERE product_id = ANY($1)
            ORDER BY created_at, name
            "
        ))
        .bind(ids.as_slice())
        .fetch_all(self.pool)
        .await?
        .into_iter()
        .map(Variant::try_from)
        .collect::<Result<Vec<_>, _>>()?;

        Ok(group_variants(
            products.into_iter().map(Product::from).collect(),
            variants,
        ))
    }
}
