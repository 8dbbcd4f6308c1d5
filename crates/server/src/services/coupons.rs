//! Coupon registry.

use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;
use tracing::instrument;

use flatshop_core::{Coupon, DiscountError, DiscountType, DiscountTypeError};

use crate::store::{Document, StoreError, Table};

/// Errors from coupon operations.
#[derive(Debug, Error)]
pub enum CouponError {
    /// A coupon with this code already exists.
    #[error("coupon code already exists: {0}")]
    AlreadyExists(String),

    /// The discount type is not `percentage` or `amount`.
    #[error(transparent)]
    InvalidDiscountType(#[from] DiscountTypeError),

    /// The discount value is out of range for its type.
    #[error(transparent)]
    InvalidDiscount(#[from] DiscountError),

    /// The code is empty.
    #[error("coupon code cannot be empty")]
    EmptyCode,

    /// Document store error.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// A coupon as submitted by a client.
///
/// `discount_type` stays a string so that a duplicate code is reported before
/// an unknown type.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCoupon {
    pub code: String,
    pub discount: Decimal,
    #[serde(alias = "discount_type")]
    pub discount_type: String,
    #[serde(default)]
    pub description: String,
}

/// Coupon operations over the `coupons` document.
pub struct CouponService<'a> {
    coupons: &'a Table<Coupon>,
}

impl<'a> CouponService<'a> {
    #[must_use]
    pub const fn new(coupons: &'a Table<Coupon>) -> Self {
        Self { coupons }
    }

    /// Register a new coupon.
    ///
    /// # Errors
    ///
    /// Returns `CouponError::AlreadyExists` if the code is taken, then
    /// `CouponError::InvalidDiscountType` or `CouponError::InvalidDiscount`
    /// for bad values.
    #[instrument(skip(self, new), fields(code = %new.code))]
    pub async fn add_coupon(&self, new: NewCoupon) -> Result<Coupon, CouponError> {
        if new.code.trim().is_empty() {
            return Err(CouponError::EmptyCode);
        }

        let mut tx = self.coupons.begin().await?;
        if tx.contains_key(&new.code) {
            return Err(CouponError::AlreadyExists(new.code));
        }

        let discount_type: DiscountType = new.discount_type.parse()?;
        discount_type.validate(new.discount)?;

        let coupon = Coupon {
            code: new.code,
            discount: new.discount,
            discount_type,
            description: new.description,
        };
        tx.insert(coupon.code.clone(), coupon.clone());
        tx.commit().await?;

        tracing::info!(discount_type = %coupon.discount_type, "Coupon added");
        Ok(coupon)
    }

    /// All coupons, keyed by code.
    ///
    /// # Errors
    ///
    /// Returns `CouponError::Store` if the document cannot be read.
    pub async fn list_coupons(&self) -> Result<Document<Coupon>, CouponError> {
        Ok(self.coupons.snapshot().await?)
    }
}
