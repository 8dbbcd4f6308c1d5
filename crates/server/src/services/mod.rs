//! Business logic services.
//!
//! # Services
//!
//! - `auth` - Registration, login and bearer tokens
//! - `catalog` - Products with sequential ids
//! - `coupons` - Percentage and amount coupons
//! - `cart` - Per-user carts and checkout
//!
//! Services borrow the tables they need from the [`Store`](crate::store::Store)
//! and are constructed per request.

pub mod auth;
pub mod cart;
pub mod catalog;
pub mod coupons;

pub use auth::{AuthError, AuthService, TokenSigner};
pub use cart::{CartError, CartService, Checkout};
pub use catalog::{CatalogError, CatalogService, NewProduct};
pub use coupons::{CouponError, CouponService, NewCoupon};
