//! Shipping address route handlers.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use tracing::instrument;

use super::ApiJson;
use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::models::ShippingAddress;
use crate::services::{AddressInput, AddressService};
use crate::state::AppState;

/// The signed-in user's saved addresses.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn list(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<Vec<ShippingAddress>>> {
    let addresses = AddressService::new(state.pool()).list(user.id).await?;
    Ok(Json(addresses))
}

/// Validate and save a new address.
#[instrument(skip(state, user, input), fields(user_id = %user.id))]
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiJson(input): ApiJson<AddressInput>,
) -> Result<impl IntoResponse> {
    let address = AddressService::new(state.pool())
        .create(user.id, input)
        .await?;
    Ok((StatusCode::CREATED, Json(address)))
}
