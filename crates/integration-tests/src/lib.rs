//! Integration tests for the Bewear storefront.
//!
//! # Running Tests
//!
//! ```bash
//! # Prepare a database
//! bw-cli migrate
//! bw-cli seed catalog
//!
//! # Start the server
//! cargo run -p bewear-storefront
//!
//! # Run the ignored tests against it
//! cargo test -p bewear-integration-tests -- --ignored
//! ```
//!
//! HTTP tests talk to `STOREFRONT_BASE_URL` (default `http://localhost:3000`).
//! Service tests connect directly to `STOREFRONT_DATABASE_URL`.
//!
//! The server rate limits `/api/auth/register` per client IP, so each test
//! sends its own `X-Forwarded-For` address.

use reqwest::{Client, StatusCode, header};
use secrecy::SecretString;
use serde_json::{Value, json};
use sqlx::PgPool;
use uuid::Uuid;

/// Password used for every test account.
pub const TEST_PASSWORD: &str = "correct horse battery";

/// Base URL of the running storefront.
#[must_use]
pub fn storefront_base_url() -> String {
    std::env::var("STOREFRONT_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

/// A unique email address for a throwaway account.
#[must_use]
pub fn unique_email() -> String {
    format!("test-{}@example.com", Uuid::new_v4().simple())
}

/// A client with its own cookie jar and a random forwarded IP.
///
/// # Panics
///
/// Panics if the client cannot be built.
#[must_use]
pub fn new_client() -> Client {
    let [a, b, c, ..] = Uuid::new_v4().into_bytes();
    let ip = format!("10.{a}.{b}.{c}");

    let mut headers = header::HeaderMap::new();
    headers.insert(
        "x-forwarded-for",
        header::HeaderValue::from_str(&ip).expect("generated IP is a valid header"),
    );

    Client::builder()
        .cookie_store(true)
        .default_headers(headers)
        .build()
        .expect("Failed to create HTTP client")
}

/// Register a fresh account and return a client holding its session.
///
/// # Panics
///
/// Panics if registration does not answer 201.
pub async fn signed_in_client() -> (Client, Value) {
    let client = new_client();
    let resp = client
        .post(format!("{}/api/auth/register", storefront_base_url()))
        .json(&json!({
            "name": "Test Customer",
            "email": unique_email(),
            "password": TEST_PASSWORD,
        }))
        .send()
        .await
        .expect("Failed to register");

    assert_eq!(resp.status(), StatusCode::CREATED);
    let user = resp.json().await.expect("Failed to parse user");
    (client, user)
}

/// IDs of the first `count` seeded variants, skipping `scratch-` rows made by service tests.
///
/// # Panics
///
/// Panics if the catalog has fewer variants than requested.
pub async fn variant_ids(client: &Client, count: usize) -> Vec<String> {
    let products: Vec<Value> = client
        .get(format!("{}/api/products", storefront_base_url()))
        .send()
        .await
        .expect("Failed to list products")
        .json()
        .await
        .expect("Failed to parse products");

    let ids: Vec<String> = products
        .iter()
        .flat_map(|p| p["variants"].as_array().cloned().unwrap_or_default())
        .filter(|v| !v["slug"].as_str().unwrap_or_default().starts_with("scratch-"))
        .filter_map(|v| v["id"].as_str().map(ToString::to_string))
        .take(count)
        .collect();

    assert_eq!(ids.len(), count, "seed the catalog first: bw-cli seed catalog");
    ids
}

/// A valid US address body.
#[must_use]
pub fn us_address() -> Value {
    json!({
        "recipient_name": "Jane Doe",
        "phone": "+1 (415) 555-0100",
        "email": "jane@example.com",
        "street": "Market Street",
        "number": "1355",
        "complement": "Suite 900",
        "neighborhood": "SoMa",
        "city": "San Francisco",
        "state": "ca",
        "zip_code": "94103",
        "country": "US",
    })
}

/// Connect to the storefront database.
///
/// # Panics
///
/// Panics if no database URL is configured or the connection fails.
pub async fn test_pool() -> PgPool {
    dotenvy::dotenv().ok();
    let url = std::env::var("STOREFRONT_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .expect("STOREFRONT_DATABASE_URL must be set");

    bewear_storefront::db::create_pool(&SecretString::from(url))
        .await
        .expect("Failed to connect to database")
}
