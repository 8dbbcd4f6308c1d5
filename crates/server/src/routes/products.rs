//! Catalog handlers.

use axum::{Json, extract::State};
use serde::Serialize;
use tracing::instrument;

use flatshop_core::{Product, ProductId};

use crate::error::Result;
use crate::extract::ApiJson;
use crate::middleware::RequireAuth;
use crate::services::NewProduct;
use crate::state::AppState;
use crate::store::Document;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductCreated {
    pub message: &'static str,
    pub product_id: ProductId,
}

/// Add a product to the catalog.
#[instrument(skip(state, product))]
pub async fn add_product(
    State(state): State<AppState>,
    RequireAuth(_username): RequireAuth,
    ApiJson(product): ApiJson<NewProduct>,
) -> Result<Json<ProductCreated>> {
    let product = state.catalog().add_product(product).await?;

    Ok(Json(ProductCreated {
        message: "Product added successfully",
        product_id: product.product_id,
    }))
}

/// The full catalog, keyed by product id.
#[instrument(skip(state))]
pub async fn get_products(
    State(state): State<AppState>,
    RequireAuth(_username): RequireAuth,
) -> Result<Json<Document<Product>>> {
    Ok(Json(state.catalog().list_products().await?))
}
