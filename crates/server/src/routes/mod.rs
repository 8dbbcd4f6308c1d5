//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET    /                  - Redirect to the API description
//! GET    /docs              - API description (JSON)
//! GET    /health            - Liveness
//! GET    /health/ready      - Readiness (all documents readable)
//!
//! # Auth
//! POST   /register          - Create a user
//! POST   /login             - Get a bearer token
//!
//! # Catalog (bearer token)
//! POST   /add_product       - Add a product
//! GET    /get_products      - List products
//!
//! # Coupons (bearer token)
//! POST   /add_coupon        - Add a coupon
//! GET    /get_coupons       - List coupons
//!
//! # Cart (bearer token)
//! POST   /add_to_cart       - ?productId&quantity
//! PUT    /update_cart       - ?productId&quantity
//! DELETE /delete_from_cart  - ?productId
//! GET    /get_cart          - ?couponCode, checks out
//! ```

pub mod auth;
pub mod cart;
pub mod coupons;
pub mod health;
pub mod home;
pub mod products;

use axum::{
    Router,
    routing::{delete, get, post, put},
};
use serde::Serialize;

use crate::state::AppState;

/// Method, path, whether a bearer token is required, and a description.
pub(crate) const ROUTES: &[(&str, &str, bool, &str)] = &[
    ("GET", "/", false, "Redirect to the API description"),
    ("GET", "/docs", false, "This document"),
    ("GET", "/health", false, "Liveness check"),
    ("GET", "/health/ready", false, "Readiness check"),
    ("POST", "/register", false, "Create a user from {username, password}"),
    ("POST", "/login", false, "Exchange {username, password} for a bearer token"),
    ("POST", "/add_product", true, "Add a product from {image, name, price, quantity}"),
    ("GET", "/get_products", true, "List products by id"),
    ("POST", "/add_coupon", true, "Add a coupon from {code, discount, discountType, description}"),
    ("GET", "/get_coupons", true, "List coupons by code"),
    ("POST", "/add_to_cart", true, "Add ?productId with optional ?quantity (default 1)"),
    ("PUT", "/update_cart", true, "Set ?quantity of ?productId"),
    ("DELETE", "/delete_from_cart", true, "Remove ?productId"),
    ("GET", "/get_cart", true, "Check out with optional ?couponCode"),
];

/// A bare `{"message": ...}` response.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

impl MessageResponse {
    #[must_use]
    pub const fn new(message: &'static str) -> Self {
        Self { message }
    }
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
}

/// Create the catalog and coupon routes router.
pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/add_product", post(products::add_product))
        .route("/get_products", get(products::get_products))
        .route("/add_coupon", post(coupons::add_coupon))
        .route("/get_coupons", get(coupons::get_coupons))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/add_to_cart", post(cart::add_to_cart))
        .route("/update_cart", put(cart::update_cart))
        .route("/delete_from_cart", delete(cart::delete_from_cart))
        .route("/get_cart", get(cart::get_cart))
}

/// Create all routes for the server.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .route("/docs", get(home::docs))
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .merge(auth_routes())
        .merge(catalog_routes())
        .merge(cart_routes())
}
