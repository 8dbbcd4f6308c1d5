//! Flatshop Core - Domain types and pricing rules.
//!
//! This crate provides the types shared by every flatshop component:
//! - `server` - HTTP API (auth, catalog, coupons, carts)
//! - `cli` - Command-line tools for data files and seeding
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no storage,
//! no HTTP. Cart totals and coupon pricing live here so that every caller
//! computes them the same way.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for ids, usernames and prices
//! - [`catalog`] - Products and stock
//! - [`coupon`] - Coupons and discount application
//! - [`cart`] - Carts with incrementally maintained totals

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod coupon;
pub mod types;

pub use cart::{Cart, CartLine, LineError};
pub use catalog::Product;
pub use coupon::{Coupon, CouponOutcome, DiscountError, DiscountType, DiscountTypeError};
pub use types::*;
