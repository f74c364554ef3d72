//! Cart endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use cart_store::Cart;
use common::{ProductId, UserId};
use serde::Deserialize;

use crate::AppState;
use crate::error::ApiError;

#[derive(Deserialize)]
pub struct AddItemRequest {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// GET /carts/{user_id}: the user's cart, empty if none exists.
#[tracing::instrument(skip(state))]
pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<Cart>, ApiError> {
    let cart = state.carts.get_cart(&UserId::new(user_id)).await?;
    Ok(Json(cart))
}

/// POST /carts/{user_id}/items: add units of a product.
#[tracing::instrument(skip(state, payload))]
pub async fn add_item(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    payload: Result<Json<AddItemRequest>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let Json(req) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    state
        .carts
        .add_item(&UserId::new(user_id), &req.product_id, req.quantity)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /carts/{user_id}: empty the cart.
#[tracing::instrument(skip(state))]
pub async fn empty(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.carts.empty_cart(&UserId::new(user_id)).await?;
    Ok(StatusCode::NO_CONTENT)
}
