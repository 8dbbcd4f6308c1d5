//! Cart route handlers.
//!
//! Every handler acts on the cart of the authenticated user and answers with
//! a message plus the resulting cart.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use flatshop_core::{Cart, ProductId};

use crate::error::{Result, add_breadcrumb};
use crate::extract::ApiQuery;
use crate::middleware::RequireAuth;
use crate::state::AppState;

/// Message and cart returned by every cart operation.
#[derive(Debug, Serialize)]
pub struct CartResponse {
    pub message: String,
    pub cart: Cart,
}

impl CartResponse {
    fn new(message: impl Into<String>, cart: Cart) -> Json<Self> {
        Json(Self {
            message: message.into(),
            cart,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartQuery {
    #[serde(alias = "product_id")]
    pub product_id: ProductId,
    pub quantity: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCartQuery {
    #[serde(alias = "product_id")]
    pub product_id: ProductId,
    pub quantity: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteFromCartQuery {
    #[serde(alias = "product_id")]
    pub product_id: ProductId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutQuery {
    #[serde(alias = "coupon_code")]
    pub coupon_code: Option<String>,
}

/// Add a product to the cart (quantity defaults to 1).
#[instrument(skip(state))]
pub async fn add_to_cart(
    State(state): State<AppState>,
    RequireAuth(username): RequireAuth,
    ApiQuery(query): ApiQuery<AddToCartQuery>,
) -> Result<Json<CartResponse>> {
    let cart = state
        .carts()
        .add_to_cart(&username, query.product_id, query.quantity.unwrap_or(1))
        .await?;

    Ok(CartResponse::new("Product added to cart successfully", cart))
}

/// Change the quantity of a product in the cart.
#[instrument(skip(state))]
pub async fn update_cart(
    State(state): State<AppState>,
    RequireAuth(username): RequireAuth,
    ApiQuery(query): ApiQuery<UpdateCartQuery>,
) -> Result<Json<CartResponse>> {
    let cart = state
        .carts()
        .update_cart(&username, query.product_id, query.quantity)
        .await?;

    Ok(CartResponse::new("Cart updated successfully", cart))
}

/// Remove a product from the cart.
#[instrument(skip(state))]
pub async fn delete_from_cart(
    State(state): State<AppState>,
    RequireAuth(username): RequireAuth,
    ApiQuery(query): ApiQuery<DeleteFromCartQuery>,
) -> Result<Json<CartResponse>> {
    let cart = state
        .carts()
        .delete_from_cart(&username, query.product_id)
        .await?;

    Ok(CartResponse::new("Product deleted from cart successfully", cart))
}

/// Check out, optionally applying a coupon.
#[instrument(skip(state))]
pub async fn get_cart(
    State(state): State<AppState>,
    RequireAuth(username): RequireAuth,
    ApiQuery(query): ApiQuery<CheckoutQuery>,
) -> Result<Json<CartResponse>> {
    let coupon_code = query.coupon_code.as_deref().unwrap_or("");
    add_breadcrumb("cart", "Checkout", Some(&[("coupon_code", coupon_code)]));

    let checkout = state
        .carts()
        .checkout(&username, query.coupon_code.as_deref())
        .await?;

    Ok(CartResponse::new(checkout.message(), checkout.cart))
}
