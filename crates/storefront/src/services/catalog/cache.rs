//! Cache types for catalog reads.

use crate::models::catalog::{Category, CategoryPage, ProductWithVariants, VariantPage};

/// Cache key for catalog lookups.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Categories,
    Category(String),
    Products,
    Variant(String),
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Categories(Vec<Category>),
    Category(Box<CategoryPage>),
    Products(Vec<ProductWithVariants>),
    Variant(Box<VariantPage>),
}
