//! Coupon handlers.

use axum::{Json, extract::State};
use tracing::instrument;

use flatshop_core::Coupon;

use crate::error::Result;
use crate::extract::ApiJson;
use crate::middleware::RequireAuth;
use crate::routes::MessageResponse;
use crate::services::NewCoupon;
use crate::state::AppState;
use crate::store::Document;

/// Register a coupon.
#[instrument(skip(state, coupon), fields(code = %coupon.code))]
pub async fn add_coupon(
    State(state): State<AppState>,
    RequireAuth(_username): RequireAuth,
    ApiJson(coupon): ApiJson<NewCoupon>,
) -> Result<Json<MessageResponse>> {
    state.coupons().add_coupon(coupon).await?;
    Ok(Json(MessageResponse::new("Coupon added successfully")))
}

/// All coupons, keyed by code.
#[instrument(skip(state))]
pub async fn get_coupons(
    State(state): State<AppState>,
    RequireAuth(_username): RequireAuth,
) -> Result<Json<Document<Coupon>>> {
    Ok(Json(state.coupons().list_coupons().await?))
}
