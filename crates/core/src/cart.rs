//! Per-user carts.
//!
//! A [`Cart`] keeps `total_price` and `total_quantity` up to date as lines are
//! added, changed and removed, so that at every point:
//!
//! - `total_price` is the sum of `price × quantity` over all lines
//! - `total_quantity` is the sum of `quantity` over all lines
//! - each product appears in at most one line
//!
//! Any line change clears a previously applied coupon, since the discounted
//! price no longer matches the total.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::catalog::Product;
use crate::coupon::{Coupon, CouponOutcome};
use crate::types::{Price, ProductId, Username};

/// Errors from cart line operations.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum LineError {
    /// The product already has a line in this cart.
    #[error("product {0} is already in the cart")]
    AlreadyInCart(ProductId),
    /// The product has no line in this cart.
    #[error("product {0} is not in the cart")]
    NotInCart(ProductId),
    /// A line subtotal or cart total does not fit in a `Decimal`.
    #[error("amount too large")]
    AmountTooLarge,
}

/// A product snapshot held in a cart.
///
/// The price, name and image are copied from the catalog when the line is
/// created and are not refreshed afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub product_id: ProductId,
    pub image: String,
    pub name: String,
    pub price: Price,
    pub quantity: u32,
}

impl CartLine {
    /// Snapshot `product` with a requested quantity.
    #[must_use]
    pub fn from_product(product: &Product, quantity: u32) -> Self {
        Self {
            product_id: product.product_id,
            image: product.image.clone(),
            name: product.name.clone(),
            price: product.price,
            quantity,
        }
    }

    /// `price × quantity`.
    ///
    /// # Errors
    ///
    /// Returns `LineError::AmountTooLarge` if the product overflows.
    pub fn subtotal(&self) -> Result<Decimal, LineError> {
        self.price
            .times(self.quantity)
            .ok_or(LineError::AmountTooLarge)
    }
}

/// A user's cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    username: Username,
    products: Vec<CartLine>,
    total_price: Decimal,
    total_quantity: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    discounted_price: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    applied_coupon: Option<Coupon>,
}

impl Cart {
    /// An empty cart for `username`.
    #[must_use]
    pub const fn new(username: Username) -> Self {
        Self {
            username,
            products: Vec::new(),
            total_price: Decimal::ZERO,
            total_quantity: 0,
            discounted_price: None,
            applied_coupon: None,
        }
    }

    #[must_use]
    pub const fn username(&self) -> &Username {
        &self.username
    }

    /// Lines in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.products
    }

    #[must_use]
    pub fn line(&self, product_id: ProductId) -> Option<&CartLine> {
        self.products.iter().find(|l| l.product_id == product_id)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    #[must_use]
    pub const fn total_price(&self) -> Decimal {
        self.total_price
    }

    #[must_use]
    pub const fn total_quantity(&self) -> u64 {
        self.total_quantity
    }

    /// Price after the last applied coupon, if any.
    #[must_use]
    pub const fn discounted_price(&self) -> Option<Decimal> {
        self.discounted_price
    }

    #[must_use]
    pub const fn applied_coupon(&self) -> Option<&Coupon> {
        self.applied_coupon.as_ref()
    }

    /// Totals recomputed from the lines, for checking stored carts.
    ///
    /// # Errors
    ///
    /// Returns `LineError::AmountTooLarge` if the sum overflows.
    pub fn sum_of_lines(&self) -> Result<(Decimal, u64), LineError> {
        self.products
            .iter()
            .try_fold((Decimal::ZERO, 0), |(price, qty), l| {
                let price = price
                    .checked_add(l.subtotal()?)
                    .ok_or(LineError::AmountTooLarge)?;
                Ok((price, qty + u64::from(l.quantity)))
            })
    }

    /// Append a new line.
    ///
    /// # Errors
    ///
    /// Returns `LineError::AlreadyInCart` if the product already has a line,
    /// or `LineError::AmountTooLarge` if the new total overflows. The cart is
    /// unchanged on error.
    pub fn add_line(&mut self, line: CartLine) -> Result<(), LineError> {
        if self.line(line.product_id).is_some() {
            return Err(LineError::AlreadyInCart(line.product_id));
        }
        self.total_price = self
            .total_price
            .checked_add(line.subtotal()?)
            .ok_or(LineError::AmountTooLarge)?;
        self.total_quantity += u64::from(line.quantity);
        self.products.push(line);
        self.clear_coupon();
        Ok(())
    }

    /// Replace the quantity of an existing line.
    ///
    /// # Errors
    ///
    /// Returns `LineError::NotInCart` if the product has no line, or
    /// `LineError::AmountTooLarge` if the new total overflows. The cart is
    /// unchanged on error.
    pub fn set_quantity(&mut self, product_id: ProductId, quantity: u32) -> Result<(), LineError> {
        let line = self
            .products
            .iter_mut()
            .find(|l| l.product_id == product_id)
            .ok_or(LineError::NotInCart(product_id))?;

        let old_subtotal = line.subtotal()?;
        let new_subtotal = line.price.times(quantity).ok_or(LineError::AmountTooLarge)?;
        let total_price = self
            .total_price
            .checked_sub(old_subtotal)
            .and_then(|rest| rest.checked_add(new_subtotal))
            .ok_or(LineError::AmountTooLarge)?;

        let old_quantity = u64::from(line.quantity);
        line.quantity = quantity;
        self.total_price = total_price;
        self.total_quantity = self.total_quantity.saturating_sub(old_quantity) + u64::from(quantity);
        self.clear_coupon();
        Ok(())
    }

    /// Remove a line and return it.
    ///
    /// # Errors
    ///
    /// Returns `LineError::NotInCart` if the product has no line.
    pub fn remove_line(&mut self, product_id: ProductId) -> Result<CartLine, LineError> {
        let (index, line) = self
            .products
            .iter()
            .enumerate()
            .find(|(_, l)| l.product_id == product_id)
            .ok_or(LineError::NotInCart(product_id))?;
        let total_price = self
            .total_price
            .checked_sub(line.subtotal()?)
            .ok_or(LineError::AmountTooLarge)?;

        let line = self.products.remove(index);
        self.total_price = total_price;
        self.total_quantity = self.total_quantity.saturating_sub(u64::from(line.quantity));
        self.clear_coupon();
        Ok(line)
    }

    /// Apply `coupon` to the current total and record it on the cart.
    ///
    /// # Errors
    ///
    /// Returns `LineError::AmountTooLarge` if the discounted price cannot be
    /// computed. No coupon is recorded in that case.
    pub fn apply_coupon(&mut self, coupon: &Coupon) -> Result<CouponOutcome, LineError> {
        let (price, outcome) = coupon
            .discounted_price(self.total_price)
            .ok_or(LineError::AmountTooLarge)?;
        self.discounted_price = Some(price);
        self.applied_coupon = Some(coupon.clone());
        Ok(outcome)
    }

    fn clear_coupon(&mut self) {
        self.discounted_price = None;
        self.applied_coupon = None;
    }
}
