//! Cart route handlers.
//!
//! Every mutation answers with the updated cart so clients can re-render
//! without a second request.

use axum::{
    Json,
    extract::State,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use bewear_core::{AddressId, CartItemId, Money, Quantity, VariantId};

use super::{ApiJson, ApiPath};
use crate::error::{AppError, Result, add_breadcrumb};
use crate::middleware::RequireAuth;
use crate::models::{CartDetails, CurrentUser};
use crate::services::{CartError, CartService};
use crate::state::AppState;

/// Cart response: lines, bound address and computed totals.
#[derive(Debug, Serialize)]
pub struct CartView {
    #[serde(flatten)]
    pub details: CartDetails,
    pub total: Money,
    pub item_count: i64,
}

impl TryFrom<CartDetails> for CartView {
    type Error = AppError;

    fn try_from(details: CartDetails) -> std::result::Result<Self, Self::Error> {
        let total = details
            .total()
            .map_err(|e| AppError::Internal(format!("cart {} total: {e}", details.cart.id)))?;
        let item_count = details.item_count();

        Ok(Self {
            details,
            total,
            item_count,
        })
    }
}

/// Add-to-cart request body.
#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub product_variant_id: VariantId,
    #[serde(default = "default_quantity")]
    pub quantity: i64,
}

const fn default_quantity() -> i64 {
    1
}

/// Shipping address selection body.
#[derive(Debug, Deserialize)]
pub struct ShippingAddressRequest {
    pub shipping_address_id: AddressId,
}

async fn cart_view(cart: &CartService<'_>, user: &CurrentUser) -> Result<Json<CartView>> {
    let details = cart.get_cart(user.id).await?;
    Ok(Json(CartView::try_from(details)?))
}

/// The signed-in user's cart.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<CartView>> {
    cart_view(&CartService::new(state.pool()), &user).await
}

/// Add a variant to the cart, merging with an existing line.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn add_item(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiJson(body): ApiJson<AddItemRequest>,
) -> Result<Json<CartView>> {
    let quantity = Quantity::try_from(body.quantity).map_err(CartError::from)?;
    let cart = CartService::new(state.pool());

    cart.add_product(user.id, body.product_variant_id, quantity).await?;

    let variant_id = body.product_variant_id.to_string();
    add_breadcrumb(
        "cart",
        "Added product to cart",
        Some(&[("variant_id", variant_id.as_str())]),
    );

    cart_view(&cart, &user).await
}

/// Decrease a line by one unit; the last unit removes the line.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn decrease_item(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiPath(item_id): ApiPath<CartItemId>,
) -> Result<Json<CartView>> {
    let cart = CartService::new(state.pool());
    cart.decrease_quantity(user.id, item_id).await?;
    cart_view(&cart, &user).await
}

/// Remove a line.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn remove_item(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiPath(item_id): ApiPath<CartItemId>,
) -> Result<Json<CartView>> {
    let cart = CartService::new(state.pool());
    cart.remove_item(user.id, item_id).await?;
    cart_view(&cart, &user).await
}

/// Bind one of the user's saved addresses to the cart.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn set_shipping_address(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiJson(body): ApiJson<ShippingAddressRequest>,
) -> Result<Json<CartView>> {
    let cart = CartService::new(state.pool());
    cart.set_shipping_address(user.id, body.shipping_address_id).await?;
    cart_view(&cart, &user).await
}
