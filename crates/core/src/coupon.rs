//! Coupons and discount application.

use core::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// How a coupon's `discount` is applied to a cart total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscountType {
    /// `discount` is a percentage of the total.
    Percentage,
    /// `discount` is a fixed amount subtracted from the total.
    Amount,
}

/// Error returned when parsing an unknown discount type.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid discount type: {0}")]
pub struct DiscountTypeError(pub String);

/// Errors for discount values that cannot be applied.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DiscountError {
    /// The discount is below zero.
    #[error("discount cannot be negative")]
    Negative,
    /// A percentage discount above 100.
    #[error("percentage discount cannot exceed 100")]
    PercentageOverHundred,
}

impl DiscountType {
    /// The wire name of this discount type.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Percentage => "percentage",
            Self::Amount => "amount",
        }
    }

    /// Check that `discount` is meaningful for this discount type.
    ///
    /// # Errors
    ///
    /// Returns `DiscountError` if the discount is negative, or a percentage
    /// above 100.
    pub fn validate(&self, discount: Decimal) -> Result<(), DiscountError> {
        if discount < Decimal::ZERO {
            return Err(DiscountError::Negative);
        }
        if *self == Self::Percentage && discount > Decimal::ONE_HUNDRED {
            return Err(DiscountError::PercentageOverHundred);
        }
        Ok(())
    }
}

impl fmt::Display for DiscountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DiscountType {
    type Err = DiscountTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "percentage" => Ok(Self::Percentage),
            "amount" => Ok(Self::Amount),
            other => Err(DiscountTypeError(other.to_owned())),
        }
    }
}

/// A discount rule keyed by its code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coupon {
    /// Unique coupon code.
    pub code: String,
    /// Percentage or amount, depending on `discount_type`.
    pub discount: Decimal,
    /// How `discount` applies.
    #[serde(alias = "discount_type")]
    pub discount_type: DiscountType,
    /// Free-form description.
    pub description: String,
}

/// What applying a coupon did to a cart total.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CouponOutcome {
    /// A percentage was taken off.
    Percentage(Decimal),
    /// A fixed amount was taken off.
    Amount(Decimal),
    /// The amount exceeded the total, which was clamped to zero.
    Free,
}

impl fmt::Display for CouponOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Percentage(d) => write!(f, "{}% discount applied", d.normalize()),
            Self::Amount(d) => write!(f, "{} discount applied", d.normalize()),
            Self::Free => f.write_str("you got the product for free"),
        }
    }
}

impl Coupon {
    /// Price `total` after this coupon.
    ///
    /// Percentage coupons yield `total × (1 − discount/100)`. Amount coupons
    /// yield `total − discount`, clamped to zero when the discount is larger
    /// than the total.
    ///
    /// Returns `None` if the result does not fit in a `Decimal`.
    #[must_use]
    pub fn discounted_price(&self, total: Decimal) -> Option<(Decimal, CouponOutcome)> {
        match self.discount_type {
            DiscountType::Percentage => {
                let rate = Decimal::ONE_HUNDRED
                    .checked_sub(self.discount)?
                    .checked_div(Decimal::ONE_HUNDRED)?;
                Some((
                    total.checked_mul(rate)?,
                    CouponOutcome::Percentage(self.discount),
                ))
            }
            DiscountType::Amount if total < self.discount => {
                Some((Decimal::ZERO, CouponOutcome::Free))
            }
            DiscountType::Amount => Some((
                total.checked_sub(self.discount)?,
                CouponOutcome::Amount(self.discount),
            )),
        }
    }
}
