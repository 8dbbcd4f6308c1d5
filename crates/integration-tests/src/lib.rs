//! Integration tests for flatshop.
//!
//! The tests drive the real router with `tower::ServiceExt::oneshot` over an
//! in-memory document store, so no server or data directory is needed.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p flatshop-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `auth` - Registration, login and bearer tokens
//! - `catalog` - Products and coupons
//! - `cart` - Cart edits and checkout
//! - `service` - Health, docs and request IDs

use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;

use axum::{
    Router,
    body::Body,
    http::{HeaderMap, Method, Request, StatusCode, header},
};
use rust_decimal::Decimal;
use secrecy::SecretString;
use serde_json::{Value, json};
use tower::ServiceExt;

use flatshop_server::config::{ServerConfig, TokenConfig};
use flatshop_server::services::auth::TokenAlgorithm;
use flatshop_server::state::AppState;
use flatshop_server::store::Store;

/// High-entropy signing secret used by every test app.
pub const TEST_SECRET: &str = "q7Vb#2LmX9@wRt4!Kp8zN3&fJ6^hY1sD";

/// Configuration for tests. Nothing is bound and nothing touches disk.
#[must_use]
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: IpAddr::V4(Ipv4Addr::LOCALHOST),
        port: 0,
        data_dir: PathBuf::from("unused"),
        token: TokenConfig {
            secret: SecretString::from(TEST_SECRET),
            algorithm: TokenAlgorithm::Hs256,
            ttl_minutes: 30,
        },
        docs_url: "/docs".to_string(),
        log_json: false,
        sentry_dsn: None,
        sentry_environment: None,
    }
}

/// A response with its body decoded.
///
/// Bodies that are not JSON (such as `/health`) become a JSON string.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestResponse {
    /// The `detail` of an error body.
    #[must_use]
    pub fn detail(&self) -> &str {
        self.body["detail"].as_str().unwrap_or_default()
    }
}

/// The app under test.
#[derive(Clone)]
pub struct TestApp {
    pub state: AppState,
    router: Router,
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

impl TestApp {
    /// An app over an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    #[must_use]
    pub fn with_config(config: ServerConfig) -> Self {
        let state = AppState::new(config, Store::in_memory());
        let router = flatshop_server::app(state.clone());
        Self { state, router }
    }

    /// Send one request through the router.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be built or the body cannot be read.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("request should build");

        self.send(request).await
    }

    /// Send a prebuilt request through the router.
    ///
    /// # Panics
    ///
    /// Panics if the body cannot be read.
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body should be readable");
        let body = serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));

        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> TestResponse {
        self.request(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> TestResponse {
        self.request(Method::POST, uri, token, Some(body)).await
    }

    /// Register `username` and return a bearer token for it.
    ///
    /// # Panics
    ///
    /// Panics if registration or login fails.
    pub async fn login_as(&self, username: &str) -> String {
        let credentials = json!({ "username": username, "password": "pa55word" });

        let registered = self.post("/register", None, credentials.clone()).await;
        assert_eq!(registered.status, StatusCode::OK, "{:?}", registered.body);

        let login = self.post("/login", None, credentials).await;
        assert_eq!(login.status, StatusCode::OK, "{:?}", login.body);
        login.body["token"]
            .as_str()
            .expect("login returns a token")
            .to_string()
    }

    /// Add a product and return its id.
    ///
    /// # Panics
    ///
    /// Panics if the product is rejected.
    pub async fn add_product(&self, token: &str, name: &str, price: &str, quantity: u32) -> u64 {
        let response = self
            .post(
                "/add_product",
                Some(token),
                json!({
                    "image": format!("https://img.example/{name}.png"),
                    "name": name,
                    "price": price,
                    "quantity": quantity,
                }),
            )
            .await;
        assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
        response.body["productId"]
            .as_u64()
            .expect("productId is a number")
    }

    /// Add a coupon.
    ///
    /// # Panics
    ///
    /// Panics if the coupon is rejected.
    pub async fn add_coupon(&self, token: &str, code: &str, discount: &str, discount_type: &str) {
        let response = self
            .post(
                "/add_coupon",
                Some(token),
                json!({
                    "code": code,
                    "discount": discount,
                    "discountType": discount_type,
                    "description": format!("{code} coupon"),
                }),
            )
            .await;
        assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
    }

    /// Stock of a product as currently stored.
    ///
    /// # Panics
    ///
    /// Panics if the product does not exist.
    pub async fn stock(&self, product_id: u64) -> u32 {
        self.state
            .store()
            .products()
            .get(&product_id.to_string())
            .await
            .expect("products document is readable")
            .expect("product exists")
            .quantity
    }
}

/// Read a decimal that may be serialized as a string or a number.
///
/// # Panics
///
/// Panics if the value is neither.
#[must_use]
pub fn decimal(value: &Value) -> Decimal {
    match value {
        Value::String(s) => s.parse().expect("decimal string"),
        Value::Number(n) => n.to_string().parse().expect("decimal number"),
        other => panic!("not a decimal: {other}"),
    }
}

/// Shorthand for a decimal literal in assertions.
///
/// # Panics
///
/// Panics if `s` is not a decimal.
#[must_use]
pub fn dec(s: &str) -> Decimal {
    s.parse().expect("decimal literal")
}
