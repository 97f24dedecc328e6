//! Seed the catalog from a YAML file.
//!
//! Categories, products and variants are upserted by slug, so seeding twice
//! updates rows in place instead of duplicating them. Rows missing from the
//! file are left alone: order items keep referencing their variants.
//!
//! # File format
//!
//! ```yaml
//! categories:
//!   - name: "Accessories"
//!     products:
//!       - name: "Backpack"
//!         description: "Durable and comfortable backpack."
//!         variants:
//!           - color: Black
//!             price_in_cents: 12999
//!             image_urls:
//!               - "https://example.com/backpack-black.jpg"
//! ```

use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;
use tracing::{error, info};

use bewear_core::{CurrencyCode, slugify};
use bewear_storefront::db::RepositoryError;
use bewear_storefront::db::catalog::{CatalogRepository, NewCategory, NewProduct, NewVariant};

use super::{CommandError, connect};

/// Errors that can occur while seeding.
#[derive(Debug, Error)]
pub enum SeedError {
    /// The seed file could not be read.
    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    /// The seed file is not valid YAML for the catalog format.
    #[error("Invalid seed file: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// The catalog failed validation.
    #[error("{0} validation errors found")]
    Invalid(usize),

    /// Could not connect.
    #[error(transparent)]
    Connect(#[from] CommandError),

    /// A write failed.
    #[error("Database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Root of the seed file.
#[derive(Debug, Deserialize)]
pub struct CatalogSeed {
    pub categories: Vec<CategorySeed>,
}

/// A category and its products.
#[derive(Debug, Deserialize)]
pub struct CategorySeed {
    pub name: String,
    #[serde(default)]
    pub products: Vec<ProductSeed>,
}

/// A product and its variants.
#[derive(Debug, Deserialize)]
pub struct ProductSeed {
    pub name: String,
    pub description: String,
    pub variants: Vec<VariantSeed>,
}

/// One color of a product.
#[derive(Debug, Deserialize)]
pub struct VariantSeed {
    pub color: String,
    pub price_in_cents: i32,
    #[serde(default)]
    pub currency: CurrencyCode,
    #[serde(default)]
    pub image_urls: Vec<String>,
}

/// Counts of rows written.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    pub categories: usize,
    pub products: usize,
    pub variants: usize,
}

impl CatalogSeed {
    /// Check names, slugs and prices before anything is written.
    ///
    /// Returns one message per problem; an empty list means the file is valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        let mut category_slugs = HashSet::new();
        let mut product_slugs = HashSet::new();
        let mut variant_slugs = HashSet::new();

        for category in &self.categories {
            let slug = slugify(&category.name);
            if slug.is_empty() {
                errors.push(format!("category {:?} has an empty slug", category.name));
            } else if !category_slugs.insert(slug.clone()) {
                errors.push(format!("duplicate category slug {slug}"));
            }

            for product in &category.products {
                let product_slug = slugify(&product.name);
                if product_slug.is_empty() {
                    errors.push(format!("product {:?} has an empty slug", product.name));
                } else if !product_slugs.insert(product_slug.clone()) {
                    errors.push(format!("duplicate product slug {product_slug}"));
                }
                if product.variants.is_empty() {
                    errors.push(format!("product {} has no variants", product.name));
                }

                for variant in &product.variants {
                    let variant_slug = variant_slug(&product.name, &variant.color);
                    if variant.color.trim().is_empty() {
                        errors.push(format!("product {} has a variant without color", product.name));
                    } else if !variant_slugs.insert(variant_slug.clone()) {
                        errors.push(format!("duplicate variant slug {variant_slug}"));
                    }
                    if variant.price_in_cents < 0 {
                        errors.push(format!("variant {variant_slug} has a negative price"));
                    }
                }
            }
        }

        errors
    }
}

/// Slug of a product's color variant.
#[must_use]
pub fn variant_slug(product_name: &str, color: &str) -> String {
    slugify(&format!("{product_name}-{color}"))
}

/// Seed the catalog from `file_path`.
///
/// # Errors
///
/// Returns `SeedError` if the file can't be read or parsed, fails
/// validation, or a database write fails.
pub async fn catalog(file_path: &str) -> Result<SeedSummary, SeedError> {
    let path = Path::new(file_path);
    info!(path = %file_path, "Loading catalog seed");

    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| SeedError::Read {
            path: file_path.to_owned(),
            source,
        })?;
    let seed: CatalogSeed = serde_yaml::from_str(&content)?;

    // Validate before connecting to the database
    let errors = seed.validate();
    if !errors.is_empty() {
        error!("Seed validation failed:");
        for err in &errors {
            error!("  - {err}");
        }
        return Err(SeedError::Invalid(errors.len()));
    }

    let pool = connect().await?;
    let repo = CatalogRepository::new(&pool);
    let mut summary = SeedSummary::default();

    for category_seed in &seed.categories {
        let category_slug = slugify(&category_seed.name);
        let category = repo
            .upsert_category(&NewCategory {
                name: &category_seed.name,
                slug: &category_slug,
            })
            .await?;
        summary.categories += 1;
        info!(category = %category.name, "Seeded category");

        for product_seed in &category_seed.products {
            let product_slug = slugify(&product_seed.name);
            let product = repo
                .upsert_product(&NewProduct {
                    category_id: category.id,
                    name: &product_seed.name,
                    slug: &product_slug,
                    description: &product_seed.description,
                })
                .await?;
            summary.products += 1;

            for variant_seed in &product_seed.variants {
                let slug = variant_slug(&product_seed.name, &variant_seed.color);
                repo.upsert_variant(&NewVariant {
                    product_id: product.id,
                    name: &variant_seed.color,
                    slug: &slug,
                    color: &variant_seed.color,
                    image_urls: &variant_seed.image_urls,
                    price_in_cents: variant_seed.price_in_cents,
                    currency: variant_seed.currency,
                })
                .await?;
                summary.variants += 1;
            }
        }
    }

    info!(
        categories = summary.categories,
        products = summary.products,
        variants = summary.variants,
        "Seeding complete!"
    );
    Ok(summary)
}
