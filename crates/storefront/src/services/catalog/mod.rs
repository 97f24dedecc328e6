//! Catalog read service.
//!
//! Caches categories, product listings and variant pages using `moka`
//! (5-minute TTL). The catalog only changes through `bw-cli seed`, so
//! entries are never invalidated by request handlers.

mod cache;

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use sqlx::PgPool;
use tracing::{debug, instrument};

use cache::{CacheKey, CacheValue};

use crate::db::{CatalogRepository, RepositoryError};
use crate::models::catalog::{Category, CategoryPage, ProductWithVariants, VariantPage};

/// Catalog reads with an in-process cache.
#[derive(Clone)]
pub struct CatalogService {
    inner: Arc<CatalogServiceInner>,
}

struct CatalogServiceInner {
    pool: PgPool,
    cache: Cache<CacheKey, CacheValue>,
}

impl CatalogService {
    /// Create a catalog service backed by `pool`.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();

        Self {
            inner: Arc::new(CatalogServiceInner { pool, cache }),
        }
    }

    fn repo(&self) -> CatalogRepository<'_> {
        CatalogRepository::new(&self.inner.pool)
    }

    /// All categories, ordered by name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the database read fails.
    #[instrument(skip(self))]
    pub async fn categories(&self) -> Result<Vec<Category>, RepositoryError> {
        if let Some(CacheValue::Categories(categories)) =
            self.inner.cache.get(&CacheKey::Categories).await
        {
            debug!("Cache hit for categories");
            return Ok(categories);
        }

        let categories = self.repo().list_categories().await?;
        self.inner
            .cache
            .insert(
                CacheKey::Categories,
                CacheValue::Categories(categories.clone()),
            )
            .await;

        Ok(categories)
    }

    /// A category and its products, or `None` for an unknown slug.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the database read fails.
    #[instrument(skip(self))]
    pub async fn category_page(&self, slug: &str) -> Result<Option<CategoryPage>, RepositoryError> {
        let key = CacheKey::Category(slug.to_owned());
        if let Some(CacheValue::Category(page)) = self.inner.cache.get(&key).await {
            debug!("Cache hit for category");
            return Ok(Some(*page));
        }

        let repo = self.repo();
        let Some(category) = repo.get_category_by_slug(slug).await? else {
            return Ok(None);
        };
        let products = repo.list_products_by_category(category.id).await?;
        let page = CategoryPage { category, products };

        self.inner
            .cache
            .insert(key, CacheValue::Category(Box::new(page.clone())))
            .await;

        Ok(Some(page))
    }

    /// Every product with its variants (home listing).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the database read fails.
    #[instrument(skip(self))]
    pub async fn products(&self) -> Result<Vec<ProductWithVariants>, RepositoryError> {
        if let Some(CacheValue::Products(products)) =
            self.inner.cache.get(&CacheKey::Products).await
        {
            debug!("Cache hit for products");
            return Ok(products);
        }

        let products = self.repo().list_products().await?;
        self.inner
            .cache
            .insert(CacheKey::Products, CacheValue::Products(products.clone()))
            .await;

        Ok(products)
    }

    /// A variant with its product, sibling variants and related products.
    ///
    /// Related products are the other products in the same category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::DataCorruption` if the variant's product is missing.
    /// Returns `RepositoryError` if a database read fails.
    #[instrument(skip(self))]
    pub async fn variant_page(&self, slug: &str) -> Result<Option<VariantPage>, RepositoryError> {
        let key = CacheKey::Variant(slug.to_owned());
        if let Some(CacheValue::Variant(page)) = self.inner.cache.get(&key).await {
            debug!("Cache hit for variant");
            return Ok(Some(*page));
        }

        let repo = self.repo();
        let Some(variant) = repo.get_variant_by_slug(slug).await? else {
            return Ok(None);
        };
        let product = repo.get_product(variant.product_id).await?.ok_or_else(|| {
            RepositoryError::DataCorruption(format!("variant {} has no product", variant.id))
        })?;
        let related_products = repo
            .list_products_by_category(product.product.category_id)
            .await?
            .into_iter()
            .filter(|p| p.product.id != product.product.id)
            .collect();

        let page = VariantPage {
            variant,
            product,
            related_products,
        };

        self.inner
            .cache
            .insert(key, CacheValue::Variant(Box::new(page.clone())))
            .await;

        Ok(Some(page))
    }
}
