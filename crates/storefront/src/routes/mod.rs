//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                          - Liveness
//! GET    /health/ready                    - Readiness (database ping)
//!
//! # Catalog
//! GET    /api/categories                  - All categories
//! GET    /api/categories/{slug}           - Category with its products
//! GET    /api/products                    - Products with variants
//! GET    /api/variants/{slug}             - Variant page
//!
//! # Auth (strict rate limit on register/login)
//! POST   /api/auth/register               - Create account and sign in
//! POST   /api/auth/login                  - Sign in
//! POST   /api/auth/logout                 - Sign out
//! GET    /api/auth/me                     - Current user
//!
//! # Cart (requires auth)
//! GET    /api/cart                        - Cart with lines and total
//! POST   /api/cart/items                  - Add a variant
//! POST   /api/cart/items/{id}/decrease    - Decrease a line by one
//! DELETE /api/cart/items/{id}             - Remove a line
//! PUT    /api/cart/shipping-address       - Bind a saved address
//!
//! # Addresses (requires auth)
//! GET    /api/addresses                   - Saved addresses
//! POST   /api/addresses                   - Save an address
//!
//! # Orders (requires auth)
//! POST   /api/orders                      - Complete the cart as an order
//! GET    /api/orders                      - Order history
//! GET    /api/orders/{id}                 - Order with items
//! ```

pub mod addresses;
pub mod auth;
pub mod cart;
pub mod catalog;
pub mod health;
pub mod orders;

use axum::{
    Router,
    body::Body,
    extract::{
        FromRequest, FromRequestParts,
        rejection::{JsonRejection, PathRejection},
    },
    http::Request,
    middleware::from_fn,
    routing::{delete, get, post, put},
};
use tower_http::trace::TraceLayer;

use crate::error::AppError;
use crate::middleware::{
    api_rate_limiter, auth_rate_limiter, create_session_layer, request_id_middleware,
    security_headers_middleware,
};
use crate::state::AppState;

/// JSON body extractor whose rejections use the API error format.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

/// Path parameter extractor whose rejections use the API error format.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct ApiPath<T>(pub T);

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        // Parameter count or type mismatches are server-side.
        if rejection.status().is_server_error() {
            Self::Internal(rejection.body_text())
        } else {
            Self::BadRequest(rejection.body_text())
        }
    }
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .layer(auth_rate_limiter())
        .route("/logout", post(auth::logout))
        .route("/me", get(auth::me))
}

/// Create the catalog routes router.
pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/categories", get(catalog::categories))
        .route("/categories/{slug}", get(catalog::category))
        .route("/products", get(catalog::products))
        .route("/variants/{slug}", get(catalog::variant))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/items", post(cart::add_item))
        .route("/items/{id}/decrease", post(cart::decrease_item))
        .route("/items/{id}", delete(cart::remove_item))
        .route("/shipping-address", put(cart::set_shipping_address))
}

/// Create the account routes router (addresses and orders).
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/addresses", get(addresses::list).post(addresses::create))
        .route("/orders", get(orders::list).post(orders::complete))
        .route("/orders/{id}", get(orders::show))
}

/// Create all `/api` routes.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(catalog_routes())
        .nest("/cart", cart_routes())
        .merge(account_routes())
        .layer(api_rate_limiter())
        .nest("/auth", auth_routes())
}

/// Build the full application with middleware and state.
pub fn app(state: AppState) -> Router {
    let session_layer = create_session_layer(state.pool(), state.config());

    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .nest("/api", api_routes())
        .layer(from_fn(security_headers_middleware))
        .layer(session_layer)
        .layer(from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = tracing::field::Empty,
                )
            }),
        )
        .with_state(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::to_bytes;
    use axum::http::StatusCode;
    use secrecy::SecretString;
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;

    use super::*;
    use crate::config::StorefrontConfig;

    /// App over a pool that never connects; only routes that don't touch
    /// the database can succeed.
    fn test_app() -> Router {
        let config = StorefrontConfig {
            database_url: SecretString::from("postgres://localhost:1/bewear_test"),
            host: "127.0.0.1".parse().unwrap(),
            port: 0,
            base_url: "http://localhost:3000".to_string(),
            session_secret: SecretString::from("k9$Qz2!vR7#mW4@pL8^tY1&xC5*bN3%h"),
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
        };
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost:1/bewear_test")
            .unwrap();
        app(AppState::new(config, pool))
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .header("x-forwarded-for", "203.0.113.10")
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = test_app().oneshot(get_request("/health")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"ok");
    }

    #[tokio::test]
    async fn test_request_id_is_echoed() {
        let request = Request::builder()
            .uri("/health")
            .header("x-request-id", "req-123")
            .body(Body::empty())
            .unwrap();
        let response = test_app().oneshot(request).await.unwrap();

        assert_eq!(response.headers().get("x-request-id").unwrap(), "req-123");
    }

    #[tokio::test]
    async fn test_cart_requires_login() {
        let response = test_app().oneshot(get_request("/api/cart")).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "Login required");
    }

    #[tokio::test]
    async fn test_orders_require_login() {
        let request = Request::builder()
            .method("POST")
            .uri("/api/orders")
            .header("x-forwarded-for", "203.0.113.10")
            .body(Body::empty())
            .unwrap();
        let response = test_app().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_malformed_json_is_bad_request() {
        let request = Request::builder()
            .method("POST")
            .uri("/api/auth/login")
            .header("x-forwarded-for", "203.0.113.10")
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let response = test_app().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_malformed_path_id_is_json_bad_request() {
        let app: Router = Router::new().route(
            "/orders/{id}",
            get(|ApiPath(id): ApiPath<bewear_core::OrderId>| async move { id.to_string() }),
        );

        let response = app
            .clone()
            .oneshot(get_request("/orders/not-a-uuid"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert!(json["error"].as_str().unwrap().starts_with("Invalid URL"));

        let id = uuid::Uuid::new_v4();
        let response = app
            .oneshot(get_request(&format!("/orders/{id}")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], id.to_string().as_bytes());
    }

    #[tokio::test]
    async fn test_unknown_route_is_not_found() {
        let response = test_app()
            .oneshot(get_request("/api/nothing-here"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
