//! Integration tests for catalog browsing.
//!
//! These tests require a seeded catalog (bw-cli seed catalog) and the
//! storefront server running.

use bewear_integration_tests::{new_client, storefront_base_url};
use reqwest::StatusCode;
use serde_json::Value;

#[tokio::test]
#[ignore = "Requires running storefront server and seeded catalog"]
async fn test_categories_are_listed() {
    let categories: Vec<Value> = new_client()
        .get(format!("{}/api/categories", storefront_base_url()))
        .send()
        .await
        .expect("Failed to list categories")
        .json()
        .await
        .expect("Failed to parse categories");

    assert!(categories.iter().any(|c| c["slug"] == "accessories"));
}

#[tokio::test]
#[ignore = "Requires running storefront server and seeded catalog"]
async fn test_category_page_groups_variants() {
    let resp = new_client()
        .get(format!("{}/api/categories/accessories", storefront_base_url()))
        .send()
        .await
        .expect("Failed to get category");

    assert_eq!(resp.status(), StatusCode::OK);
    let page: Value = resp.json().await.expect("Failed to parse category");
    assert_eq!(page["category"]["name"], "Accessories");

    let products = page["products"].as_array().expect("products array");
    assert!(!products.is_empty());
    for product in products {
        assert!(!product["variants"].as_array().expect("variants array").is_empty());
    }
}

#[tokio::test]
#[ignore = "Requires running storefront server and seeded catalog"]
async fn test_variant_page_lists_related_products() {
    let resp = new_client()
        .get(format!("{}/api/variants/backpack-black", storefront_base_url()))
        .send()
        .await
        .expect("Failed to get variant");

    assert_eq!(resp.status(), StatusCode::OK);
    let page: Value = resp.json().await.expect("Failed to parse variant");
    assert_eq!(page["variant"]["slug"], "backpack-black");
    assert_eq!(page["product"]["name"], "Backpack");

    let product_id = &page["product"]["id"];
    for related in page["related_products"].as_array().expect("related array") {
        assert_ne!(&related["id"], product_id);
    }
}

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_unknown_slugs_are_not_found() {
    let client = new_client();
    let base_url = storefront_base_url();

    let category = client
        .get(format!("{base_url}/api/categories/no-such-category"))
        .send()
        .await
        .expect("Failed to get category");
    assert_eq!(category.status(), StatusCode::NOT_FOUND);

    let variant = client
        .get(format!("{base_url}/api/variants/no-such-variant"))
        .send()
        .await
        .expect("Failed to get variant");
    assert_eq!(variant.status(), StatusCode::NOT_FOUND);
}
