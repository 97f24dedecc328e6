//! Integration tests for saved shipping addresses.

use bewear_integration_tests::{signed_in_client, storefront_base_url, us_address};
use reqwest::StatusCode;
use serde_json::{Value, json};

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_create_and_list_addresses() {
    let (client, _) = signed_in_client().await;
    let base_url = storefront_base_url();

    let resp = client
        .post(format!("{base_url}/api/addresses"))
        .json(&us_address())
        .send()
        .await
        .expect("Failed to create address");
    assert_eq!(resp.status(), StatusCode::CREATED);

    let address: Value = resp.json().await.expect("Failed to parse address");
    assert_eq!(address["state"], "CA");
    assert_eq!(address["country"], "United States");
    assert_eq!(address["phone"], "+1 (415) 555-0100");

    let list: Vec<Value> = client
        .get(format!("{base_url}/api/addresses"))
        .send()
        .await
        .expect("Failed to list addresses")
        .json()
        .await
        .expect("Failed to parse addresses");
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["id"], address["id"]);
}

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_invalid_address_rejected() {
    let (client, _) = signed_in_client().await;

    let mut body = us_address();
    body["zip_code"] = json!("9410");

    let resp = client
        .post(format!("{}/api/addresses", storefront_base_url()))
        .json(&body)
        .send()
        .await
        .expect("Failed to create address");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let error: Value = resp.json().await.expect("Failed to parse error");
    assert!(error["error"].as_str().expect("message").contains("zip"));
}
