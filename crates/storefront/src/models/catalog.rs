//! Catalog domain types: categories, products and their variants.

use chrono::{DateTime, Utc};
use serde::Serialize;

use bewear_core::{CategoryId, Money, ProductId, VariantId};

/// A product category (e.g. "Sneakers").
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub slug: String,
    pub created_at: DateTime<Utc>,
}

/// A product, without its variants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Product {
    pub id: ProductId,
    pub category_id: CategoryId,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

/// A purchasable color/option of a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Variant {
    pub id: VariantId,
    pub product_id: ProductId,
    pub name: String,
    pub slug: String,
    pub color: String,
    pub image_urls: Vec<String>,
    pub price: Money,
    pub created_at: DateTime<Utc>,
}

impl Variant {
    /// First image, used as the thumbnail in listings and carts.
    #[must_use]
    pub fn thumbnail(&self) -> Option<&str> {
        self.image_urls.first().map(String::as_str)
    }
}

/// A product together with all of its variants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductWithVariants {
    #[serde(flatten)]
    pub product: Product,
    pub variants: Vec<Variant>,
}

/// A category and the products listed in it.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryPage {
    pub category: Category,
    pub products: Vec<ProductWithVariants>,
}

/// Everything shown on a variant's detail page.
#[derive(Debug, Clone, Serialize)]
pub struct VariantPage {
    pub variant: Variant,
    /// The parent product with all sibling variants.
    pub product: ProductWithVariants,
    /// Other products in the same category.
    pub related_products: Vec<ProductWithVariants>,
}

/// Attach variants to their products, preserving product order.
///
/// Variants whose product is not in `products` are dropped.
#[must_use]
pub fn group_variants(products: Vec<Product>, variants: Vec<Variant>) -> Vec<ProductWithVariants> {
    let mut grouped: Vec<ProductWithVariants> = products
        .into_iter()
        .map(|product| ProductWithVariants {
            product,
            variants: Vec::new(),
        })
        .collect();

    for variant in variants {
        if let Some(entry) = grouped
            .iter_mut()
            .find(|p| p.product.id == variant.product_id)
        {
            entry.variants.push(variant);
        }
    }

    grouped
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use bewear_core::CurrencyCode;

    use super::*;

    fn product(name: &str) -> Product {
        Product {
            id: ProductId::generate(),
            category_id: CategoryId::generate(),
            name: name.to_string(),
            slug: bewear_core::slugify(name),
            description: String::new(),
            created_at: Utc::now(),
        }
    }

    fn variant(product: &Product, color: &str) -> Variant {
        Variant {
            id: VariantId::generate(),
            product_id: product.id,
            name: color.to_string(),
            slug: bewear_core::slugify(&format!("{} {color}", product.name)),
            color: color.to_string(),
            image_urls: vec![format!("https://cdn.example/{color}.png")],
            price: Money::from_cents(12_999, CurrencyCode::USD),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_group_variants_preserves_product_order() {
        let backpack = product("Backpack");
        let cap = product("Nocta Cap");
        let variants = vec![
            variant(&cap, "Black"),
            variant(&backpack, "Black"),
            variant(&backpack, "Green"),
        ];

        let grouped = group_variants(vec![backpack.clone(), cap.clone()], variants);

        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped[0].product.id, backpack.id);
        assert_eq!(grouped[0].variants.len(), 2);
        assert_eq!(grouped[1].product.id, cap.id);
        assert_eq!(grouped[1].variants.len(), 1);
    }

    #[test]
    fn test_group_variants_drops_orphans() {
        let backpack = product("Backpack");
        let other = product("Other");
        let grouped = group_variants(vec![backpack], vec![variant(&other, "Red")]);
        assert!(grouped[0].variants.is_empty());
    }

    #[test]
    fn test_product_serializes_flat() {
        let backpack = product("Backpack");
        let grouped = group_variants(vec![backpack.clone()], vec![variant(&backpack, "Black")]);
        let json = serde_json::to_value(&grouped[0]).unwrap();
        assert_eq!(json["slug"], "backpack");
        assert_eq!(json["variants"][0]["price"]["cents"], 12_999);
        assert_eq!(json["variants"][0]["slug"], "backpack-black");
    }

    #[test]
    fn test_thumbnail() {
        let backpack = product("Backpack");
        let mut v = variant(&backpack, "Black");
        assert_eq!(v.thumbnail(), Some("https://cdn.example/Black.png"));
        v.image_urls.clear();
        assert_eq!(v.thumbnail(), None);
    }
}
