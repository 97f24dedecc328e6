//! Service-level checkout tests against the database.
//!
//! These tests require a migrated and seeded `PostgreSQL` database
//! (`STOREFRONT_DATABASE_URL`); no server is needed.

use bewear_core::{CurrencyCode, Quantity, VariantId};
use bewear_integration_tests::{TEST_PASSWORD, test_pool, unique_email};
use bewear_storefront::models::user::User;
use bewear_storefront::services::{
    AddressInput, AddressService, AuthService, CartError, CartService, OrderError, OrderService,
};
use sqlx::PgPool;

async fn create_user(pool: &PgPool) -> User {
    AuthService::new(pool)
        .register_with_password("Service Test", &unique_email(), TEST_PASSWORD)
        .await
        .expect("Failed to create user")
}

async fn any_variant(pool: &PgPool) -> VariantId {
    let id: uuid::Uuid = sqlx::query_scalar(
        "SELECT id FROM storefront.product_variant WHERE slug NOT LIKE 'scratch-%' LIMIT 1",
    )
    .fetch_one(pool)
    .await
    .expect("seed the catalog first: bw-cli seed catalog");
    VariantId::new(id)
}

fn address_input() -> AddressInput {
    AddressInput {
        recipient_name: "Jane Doe".to_string(),
        phone: "+1 415 555 0100".to_string(),
        email: "jane@example.com".to_string(),
        street: "Market Street".to_string(),
        number: "1355".to_string(),
        neighborhood: "SoMa".to_string(),
        city: "San Francisco".to_string(),
        state: "CA".to_string(),
        zip_code: "94103".to_string(),
        ..AddressInput::default()
    }
}

/// A USD variant of its own, so tests can change it without disturbing others.
async fn scratch_variant(pool: &PgPool) -> VariantId {
    let slug = format!("scratch-{}", uuid::Uuid::new_v4());
    let id: uuid::Uuid = sqlx::query_scalar(
        r"
        INSERT INTO storefront.product_variant (product_id, name, slug, color, price_in_cents, currency)
        SELECT product_id, 'Scratch', $1, 'Scratch', 1999, 'USD'
        FROM storefront.product_variant
        LIMIT 1
        RETURNING id
        ",
    )
    .bind(slug)
    .fetch_one(pool)
    .await
    .expect("seed the catalog first: bw-cli seed catalog");
    VariantId::new(id)
}

/// A user with one line in the cart and a bound shipping address.
async fn ready_to_checkout(pool: &PgPool) -> User {
    let variant = any_variant(pool).await;
    ready_to_checkout_with(pool, variant, Quantity::new(2).expect("valid")).await
}

async fn ready_to_checkout_with(pool: &PgPool, variant: VariantId, quantity: Quantity) -> User {
    let user = create_user(pool).await;
    let cart = CartService::new(pool);

    cart.add_product(user.id, variant, quantity)
        .await
        .expect("Failed to add product");

    let address = AddressService::new(pool)
        .create(user.id, address_input())
        .await
        .expect("Failed to create address");
    cart.set_shipping_address(user.id, address.id)
        .await
        .expect("Failed to bind address");

    user
}

#[tokio::test]
#[ignore = "Requires PostgreSQL with seeded catalog"]
async fn test_concurrent_checkouts_create_one_order() {
    let pool = test_pool().await;
    let user = ready_to_checkout(&pool).await;

    let first_service = OrderService::new(&pool);
    let second_service = OrderService::new(&pool);
    let (first, second) = tokio::join!(
        first_service.complete_order(user.id),
        second_service.complete_order(user.id),
    );

    let outcomes = [first, second];
    let placed = outcomes.iter().filter(|r| r.is_ok()).count();
    assert_eq!(placed, 1, "{outcomes:?}");
    assert!(
        outcomes
            .iter()
            .any(|r| matches!(r, Err(OrderError::EmptyCart)))
    );

    let orders = OrderService::new(&pool)
        .list_orders(user.id)
        .await
        .expect("Failed to list orders");
    assert_eq!(orders.len(), 1);
}

#[tokio::test]
#[ignore = "Requires PostgreSQL with seeded catalog"]
async fn test_order_snapshots_cart() {
    let pool = test_pool().await;
    let user = ready_to_checkout(&pool).await;

    let cart = CartService::new(&pool)
        .get_cart(user.id)
        .await
        .expect("Failed to load cart");
    let expected_total = cart.total().expect("total");

    let order = OrderService::new(&pool)
        .complete_order(user.id)
        .await
        .expect("Failed to complete order");
    assert_eq!(order.total, expected_total);

    let placed = OrderService::new(&pool)
        .get_order(user.id, order.id)
        .await
        .expect("Failed to load order");
    assert_eq!(placed.items.len(), cart.items.len());
    assert_eq!(placed.items[0].variant_id, cart.items[0].variant_id);
    assert_eq!(placed.items[0].quantity, cart.items[0].quantity);
    assert_eq!(placed.items[0].unit_price, cart.items[0].unit_price);

    let emptied = CartService::new(&pool)
        .get_cart(user.id)
        .await
        .expect("Failed to load cart");
    assert!(emptied.is_empty());
}

#[tokio::test]
#[ignore = "Requires PostgreSQL"]
async fn test_missing_cart_is_reported() {
    let pool = test_pool().await;
    let user = create_user(&pool).await;

    let result = OrderService::new(&pool).complete_order(user.id).await;
    assert!(matches!(result, Err(OrderError::CartNotFound)));
}

#[tokio::test]
#[ignore = "Requires PostgreSQL with seeded catalog"]
async fn test_order_items_keep_purchase_currency() {
    let pool = test_pool().await;
    let variant = scratch_variant(&pool).await;
    let user = ready_to_checkout_with(&pool, variant, Quantity::ONE).await;

    let order = OrderService::new(&pool)
        .complete_order(user.id)
        .await
        .expect("Failed to complete order");

    sqlx::query("UPDATE storefront.product_variant SET currency = 'BRL' WHERE id = $1")
        .bind(variant)
        .execute(&pool)
        .await
        .expect("Failed to reprice variant");

    let placed = OrderService::new(&pool)
        .get_order(user.id, order.id)
        .await
        .expect("Failed to load order");

    sqlx::query("UPDATE storefront.product_variant SET currency = 'USD' WHERE id = $1")
        .bind(variant)
        .execute(&pool)
        .await
        .expect("Failed to restore variant");

    assert_eq!(placed.items.len(), 1);
    assert_eq!(placed.items[0].unit_price.currency, CurrencyCode::USD);
    assert_eq!(placed.items[0].unit_price.cents, 1999);
    assert_eq!(placed.order.total.currency, CurrencyCode::USD);
}

#[tokio::test]
#[ignore = "Requires PostgreSQL with seeded catalog"]
async fn test_failed_item_insert_rolls_back_order() {
    const REJECTED_QUANTITY: i32 = 4242;

    let pool = test_pool().await;
    sqlx::query(&format!(
        r"
        CREATE OR REPLACE FUNCTION storefront.reject_marked_order_item() RETURNS trigger AS $$
        BEGIN
            IF NEW.quantity = {REJECTED_QUANTITY} THEN
                RAISE EXCEPTION 'order item rejected';
            END IF;
            RETURN NEW;
        END;
        $$ LANGUAGE plpgsql
        "
    ))
    .execute(&pool)
    .await
    .expect("Failed to create trigger function");
    sqlx::query("DROP TRIGGER IF EXISTS reject_marked_order_item ON storefront.order_item")
        .execute(&pool)
        .await
        .expect("Failed to drop old trigger");
    sqlx::query(
        r"
        CREATE TRIGGER reject_marked_order_item
        BEFORE INSERT ON storefront.order_item
        FOR EACH ROW EXECUTE FUNCTION storefront.reject_marked_order_item()
        ",
    )
    .execute(&pool)
    .await
    .expect("Failed to create trigger");

    let variant = any_variant(&pool).await;
    let quantity = Quantity::new(REJECTED_QUANTITY).expect("valid");
    let user = ready_to_checkout_with(&pool, variant, quantity).await;

    let result = OrderService::new(&pool).complete_order(user.id).await;

    sqlx::query("DROP TRIGGER IF EXISTS reject_marked_order_item ON storefront.order_item")
        .execute(&pool)
        .await
        .expect("Failed to drop trigger");

    assert!(matches!(result, Err(OrderError::Repository(_))), "{result:?}");

    let orders: i64 =
        sqlx::query_scalar(r#"SELECT count(*) FROM storefront."order" WHERE user_id = $1"#)
            .bind(user.id)
            .fetch_one(&pool)
            .await
            .expect("Failed to count orders");
    assert_eq!(orders, 0);

    let cart = CartService::new(&pool)
        .get_cart(user.id)
        .await
        .expect("Failed to load cart");
    assert_eq!(cart.items.len(), 1);
    assert_eq!(cart.items[0].variant_id, variant);
    assert_eq!(cart.items[0].quantity, quantity);
}

#[tokio::test]
#[ignore = "Requires PostgreSQL with seeded catalog"]
async fn test_cart_line_overflow_is_rejected() {
    let pool = test_pool().await;
    let user = create_user(&pool).await;
    let variant = any_variant(&pool).await;
    let cart = CartService::new(&pool);
    let most = Quantity::new(i32::MAX).expect("valid");

    cart.add_product(user.id, variant, most)
        .await
        .expect("Failed to add product");

    let result = cart.add_product(user.id, variant, Quantity::ONE).await;
    assert!(matches!(result, Err(CartError::QuantityTooLarge)), "{result:?}");

    let details = cart.get_cart(user.id).await.expect("Failed to load cart");
    assert_eq!(details.items.len(), 1);
    assert_eq!(details.items[0].quantity, most);
}
