//! Order route handlers.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};
use tracing::instrument;

use bewear_core::OrderId;

use super::ApiPath;
use crate::error::{Result, add_breadcrumb};
use crate::middleware::RequireAuth;
use crate::models::{Order, OrderWithItems};
use crate::services::OrderService;
use crate::state::AppState;

/// Turn the cart into an order.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn complete(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<impl IntoResponse> {
    let order = OrderService::new(state.pool())
        .complete_order(user.id)
        .await?;

    let order_id = order.id.to_string();
    add_breadcrumb(
        "checkout",
        "Order completed",
        Some(&[("order_id", order_id.as_str())]),
    );

    Ok((StatusCode::CREATED, Json(order)))
}

/// The signed-in user's orders, newest first.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn list(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<Vec<Order>>> {
    let orders = OrderService::new(state.pool()).list_orders(user.id).await?;
    Ok(Json(orders))
}

/// One order with its items.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiPath(order_id): ApiPath<OrderId>,
) -> Result<Json<OrderWithItems>> {
    let order = OrderService::new(state.pool())
        .get_order(user.id, order_id)
        .await?;
    Ok(Json(order))
}
