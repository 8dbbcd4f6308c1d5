//! Per-user carts and checkout.
//!
//! Cart writes hold the `carts` lock for the whole operation. Product and
//! coupon lookups happen under it, and checkout takes the `products` lock
//! last to decrement stock.

use thiserror::Error;
use tracing::instrument;

use flatshop_core::{
    Cart, CartLine, Coupon, CouponOutcome, LineError, Product, ProductId, Username,
};

use crate::store::{StoreError, Table};

/// Errors from cart operations.
#[derive(Debug, Error)]
pub enum CartError {
    #[error("Product not found")]
    ProductNotFound(ProductId),

    #[error("Product out of stock")]
    OutOfStock(ProductId),

    #[error("Product already added to cart")]
    AlreadyInCart(ProductId),

    #[error("Maximum quantity available is {0}")]
    MaximumQuantity(u32),

    #[error("Cart not found")]
    CartNotFound,

    #[error("Product not found in cart")]
    NotInCart(ProductId),

    #[error("Coupon not found")]
    CouponNotFound(String),

    #[error("Quantity must be at least 1")]
    InvalidQuantity,

    #[error("Amount too large")]
    AmountTooLarge,

    /// Document store error.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl From<LineError> for CartError {
    fn from(err: LineError) -> Self {
        match err {
            LineError::AlreadyInCart(id) => Self::AlreadyInCart(id),
            LineError::NotInCart(id) => Self::NotInCart(id),
            LineError::AmountTooLarge => Self::AmountTooLarge,
        }
    }
}

/// Result of a checkout.
#[derive(Debug, Clone)]
pub struct Checkout {
    pub cart: Cart,
    pub coupon: Option<CouponOutcome>,
}

impl Checkout {
    /// Message shown to the shopper.
    #[must_use]
    pub fn message(&self) -> String {
        self.coupon.map_or_else(
            || "Checkout successful".to_string(),
            |outcome| format!("Coupon applied successfully and {outcome}"),
        )
    }
}

/// Cart operations over the `carts`, `products` and `coupons` documents.
pub struct CartService<'a> {
    carts: &'a Table<Cart>,
    products: &'a Table<Product>,
    coupons: &'a Table<Coupon>,
}

impl<'a> CartService<'a> {
    #[must_use]
    pub const fn new(
        carts: &'a Table<Cart>,
        products: &'a Table<Product>,
        coupons: &'a Table<Coupon>,
    ) -> Self {
        Self {
            carts,
            products,
            coupons,
        }
    }

    /// Add a product to the user's cart, creating the cart if needed.
    ///
    /// # Errors
    ///
    /// Returns `CartError::ProductNotFound`, `CartError::OutOfStock` if the
    /// quantity exceeds stock, `CartError::AlreadyInCart`, or
    /// `CartError::AmountTooLarge` if the cart total would overflow.
    #[instrument(skip(self, username), fields(username = %username))]
    pub async fn add_to_cart(
        &self,
        username: &Username,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<Cart, CartError> {
        ensure_quantity(quantity)?;

        let mut carts = self.carts.begin().await?;
        let product = self.product(product_id).await?;
        if !product.has_stock_for(quantity) {
            return Err(CartError::OutOfStock(product_id));
        }

        let mut cart = carts
            .get(username.as_str())
            .cloned()
            .unwrap_or_else(|| Cart::new(username.clone()));
        cart.add_line(CartLine::from_product(&product, quantity))?;

        carts.insert(username.as_str().to_owned(), cart.clone());
        carts.commit().await?;

        tracing::info!(product_id = %product_id, quantity, "Added to cart");
        Ok(cart)
    }

    /// Replace the quantity of a product already in the cart.
    ///
    /// # Errors
    ///
    /// Returns `CartError::ProductNotFound`, `CartError::MaximumQuantity` if
    /// the quantity exceeds stock, `CartError::CartNotFound` or
    /// `CartError::NotInCart`.
    #[instrument(skip(self, username), fields(username = %username))]
    pub async fn update_cart(
        &self,
        username: &Username,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<Cart, CartError> {
        ensure_quantity(quantity)?;

        let mut carts = self.carts.begin().await?;
        let product = self.product(product_id).await?;
        if !product.has_stock_for(quantity) {
            return Err(CartError::MaximumQuantity(product.quantity));
        }

        let cart = carts
            .get_mut(username.as_str())
            .ok_or(CartError::CartNotFound)?;
        cart.set_quantity(product_id, quantity)?;
        let cart = cart.clone();
        carts.commit().await?;

        tracing::info!(product_id = %product_id, quantity, "Cart updated");
        Ok(cart)
    }

    /// Remove a product from the cart.
    ///
    /// # Errors
    ///
    /// Returns `CartError::CartNotFound` or `CartError::NotInCart`.
    #[instrument(skip(self, username), fields(username = %username))]
    pub async fn delete_from_cart(
        &self,
        username: &Username,
        product_id: ProductId,
    ) -> Result<Cart, CartError> {
        let mut carts = self.carts.begin().await?;
        let cart = carts
            .get_mut(username.as_str())
            .ok_or(CartError::CartNotFound)?;
        cart.remove_line(product_id)?;
        let cart = cart.clone();
        carts.commit().await?;

        tracing::info!(product_id = %product_id, "Removed from cart");
        Ok(cart)
    }

    /// Check out the cart, optionally applying a coupon.
    ///
    /// Stock is decremented for every line. The cart itself is kept, with the
    /// coupon recorded on it when one was given. Products are written before
    /// carts, so a failed cart write leaves stock decremented and the stored
    /// cart unchanged.
    ///
    /// # Errors
    ///
    /// Returns `CartError::CartNotFound` or `CartError::CouponNotFound`.
    #[instrument(skip(self, username), fields(username = %username))]
    pub async fn checkout(
        &self,
        username: &Username,
        coupon_code: Option<&str>,
    ) -> Result<Checkout, CartError> {
        let coupon_code = coupon_code.filter(|code| !code.is_empty());

        let mut carts = self.carts.begin().await?;
        let cart = carts
            .get_mut(username.as_str())
            .ok_or(CartError::CartNotFound)?;

        let outcome = match coupon_code {
            Some(code) => {
                let coupon = self
                    .coupons
                    .get(code)
                    .await?
                    .ok_or_else(|| CartError::CouponNotFound(code.to_owned()))?;
                Some(cart.apply_coupon(&coupon)?)
            }
            None => None,
        };
        let cart = cart.clone();

        let mut products = self.products.begin().await?;
        for line in cart.lines() {
            let Some(product) = products.get_mut(&line.product_id.to_string()) else {
                tracing::warn!(product_id = %line.product_id, "Checked out product is no longer in the catalog");
                continue;
            };
            let shortfall = product.take_stock(line.quantity);
            if shortfall > 0 {
                tracing::warn!(
                    product_id = %line.product_id,
                    requested = line.quantity,
                    shortfall,
                    "Stock ran out before checkout"
                );
            }
        }

        products.commit().await?;
        carts.commit().await?;

        tracing::info!(
            total_price = %cart.total_price(),
            coupon = coupon_code.unwrap_or(""),
            "Checkout complete"
        );
        Ok(Checkout {
            cart,
            coupon: outcome,
        })
    }

    async fn product(&self, product_id: ProductId) -> Result<Product, CartError> {
        self.products
            .get(&product_id.to_string())
            .await?
            .ok_or(CartError::ProductNotFound(product_id))
    }
}

const fn ensure_quantity(quantity: u32) -> Result<(), CartError> {
    if quantity == 0 {
        return Err(CartError::InvalidQuantity);
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    use async_trait::async_trait;
    use rust_decimal::Decimal;

    use super::*;
    use crate::services::catalog::{CatalogService, NewProduct};
    use crate::services::coupons::{CouponService, NewCoupon};
    use crate::store::{DocumentBackend, MemoryBackend, Store};

    /// Memory backend whose `carts` writes can be switched off.
    #[derive(Default)]
    struct FailingCarts {
        inner: MemoryBackend,
        fail: AtomicBool,
    }

    #[async_trait]
    impl DocumentBackend for FailingCarts {
        async fn load(&self, name: &str) -> Result<Option<String>, StoreError> {
            self.inner.load(name).await
        }

        async fn save(&self, name: &str, contents: &str) -> Result<(), StoreError> {
            if name == "carts" && self.fail.load(Ordering::SeqCst) {
                return Err(StoreError::Io {
                    document: name.to_owned(),
                    source: std::io::Error::other("disk full"),
                });
            }
            self.inner.save(name, contents).await
        }

        fn describe(&self) -> String {
            "failing carts".to_string()
        }
    }

    fn alice() -> Username {
        Username::parse("alice").unwrap()
    }

    async fn seed_product(store: &Store, price: i64, quantity: u32) -> ProductId {
        seed_priced(store, Decimal::from(price), quantity).await
    }

    async fn seed_priced(store: &Store, price: Decimal, quantity: u32) -> ProductId {
        CatalogService::new(store.products())
            .add_product(NewProduct {
                image: "https://img.example/p.png".to_string(),
                name: "Widget".to_string(),
                price,
                quantity,
            })
            .await
            .unwrap()
            .product_id
    }

    async fn seed_coupon(store: &Store, code: &str, discount: i64, discount_type: &str) {
        CouponService::new(store.coupons())
            .add_coupon(NewCoupon {
                code: code.to_string(),
                discount: Decimal::from(discount),
                discount_type: discount_type.to_string(),
                description: String::new(),
            })
            .await
            .unwrap();
    }

    fn service(store: &Store) -> CartService<'_> {
        CartService::new(store.carts(), store.products(), store.coupons())
    }

    #[tokio::test]
    async fn test_add_update_delete_totals() {
        let store = Store::in_memory();
        let id = seed_product(&store, 10, 5).await;
        let carts = service(&store);

        let cart = carts.add_to_cart(&alice(), id, 2).await.unwrap();
        assert_eq!(cart.total_price(), Decimal::from(20));
        assert_eq!(cart.total_quantity(), 2);

        let cart = carts.update_cart(&alice(), id, 4).await.unwrap();
        assert_eq!(cart.total_price(), Decimal::from(40));
        assert_eq!(cart.total_quantity(), 4);

        let cart = carts.delete_from_cart(&alice(), id).await.unwrap();
        assert_eq!(cart.total_price(), Decimal::ZERO);
        assert_eq!(cart.total_quantity(), 0);

        let stored = store.carts().get("alice").await.unwrap().unwrap();
        assert_eq!(stored, cart);
    }

    #[tokio::test]
    async fn test_add_errors() {
        let store = Store::in_memory();
        let id = seed_product(&store, 10, 5).await;
        let carts = service(&store);

        assert!(matches!(
            carts.add_to_cart(&alice(), ProductId::new(99), 1).await,
            Err(CartError::ProductNotFound(_))
        ));
        assert!(matches!(
            carts.add_to_cart(&alice(), id, 6).await,
            Err(CartError::OutOfStock(_))
        ));
        assert!(matches!(
            carts.add_to_cart(&alice(), id, 0).await,
            Err(CartError::InvalidQuantity)
        ));

        carts.add_to_cart(&alice(), id, 1).await.unwrap();
        assert!(matches!(
            carts.add_to_cart(&alice(), id, 1).await,
            Err(CartError::AlreadyInCart(_))
        ));
    }

    #[tokio::test]
    async fn test_update_errors() {
        let store = Store::in_memory();
        let id = seed_product(&store, 10, 5).await;
        let other = seed_product(&store, 3, 5).await;
        let carts = service(&store);

        assert!(matches!(
            carts.update_cart(&alice(), id, 1).await,
            Err(CartError::CartNotFound)
        ));

        carts.add_to_cart(&alice(), id, 1).await.unwrap();
        let err = carts.update_cart(&alice(), id, 9).await.unwrap_err();
        assert_eq!(err.to_string(), "Maximum quantity available is 5");
        assert!(matches!(
            carts.update_cart(&alice(), other, 1).await,
            Err(CartError::NotInCart(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_errors() {
        let store = Store::in_memory();
        let id = seed_product(&store, 10, 5).await;
        let carts = service(&store);

        assert!(matches!(
            carts.delete_from_cart(&alice(), id).await,
            Err(CartError::CartNotFound)
        ));
        carts.add_to_cart(&alice(), id, 1).await.unwrap();
        carts.delete_from_cart(&alice(), id).await.unwrap();
        assert!(matches!(
            carts.delete_from_cart(&alice(), id).await,
            Err(CartError::NotInCart(_))
        ));
    }

    #[tokio::test]
    async fn test_checkout_decrements_stock() {
        let store = Store::in_memory();
        let a = seed_product(&store, 10, 5).await;
        let b = seed_product(&store, 4, 3).await;
        let carts = service(&store);
        carts.add_to_cart(&alice(), a, 2).await.unwrap();
        carts.add_to_cart(&alice(), b, 3).await.unwrap();

        let checkout = carts.checkout(&alice(), None).await.unwrap();
        assert_eq!(checkout.message(), "Checkout successful");
        assert_eq!(checkout.cart.total_price(), Decimal::from(32));

        let products = store.products().snapshot().await.unwrap();
        assert_eq!(products["1"].quantity, 3);
        assert_eq!(products["2"].quantity, 0);

        // The cart is kept after checkout.
        assert!(store.carts().get("alice").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_checkout_with_percentage_coupon() {
        let store = Store::in_memory();
        let id = seed_product(&store, 50, 5).await;
        seed_coupon(&store, "TEN", 10, "percentage").await;
        let carts = service(&store);
        carts.add_to_cart(&alice(), id, 2).await.unwrap();

        let checkout = carts.checkout(&alice(), Some("TEN")).await.unwrap();
        assert_eq!(checkout.cart.discounted_price(), Some(Decimal::from(90)));
        assert_eq!(
            checkout.message(),
            "Coupon applied successfully and 10% discount applied"
        );

        let stored = store.carts().get("alice").await.unwrap().unwrap();
        assert_eq!(stored.applied_coupon().unwrap().code, "TEN");
    }

    #[tokio::test]
    async fn test_checkout_with_large_amount_coupon() {
        let store = Store::in_memory();
        let id = seed_product(&store, 50, 5).await;
        seed_coupon(&store, "BIG", 150, "amount").await;
        let carts = service(&store);
        carts.add_to_cart(&alice(), id, 2).await.unwrap();

        let checkout = carts.checkout(&alice(), Some("BIG")).await.unwrap();
        assert_eq!(checkout.cart.discounted_price(), Some(Decimal::ZERO));
        assert_eq!(
            checkout.message(),
            "Coupon applied successfully and you got the product for free"
        );
    }

    #[tokio::test]
    async fn test_checkout_errors() {
        let store = Store::in_memory();
        let id = seed_product(&store, 10, 5).await;
        let carts = service(&store);

        assert!(matches!(
            carts.checkout(&alice(), None).await,
            Err(CartError::CartNotFound)
        ));

        carts.add_to_cart(&alice(), id, 2).await.unwrap();
        assert!(matches!(
            carts.checkout(&alice(), Some("NOPE")).await,
            Err(CartError::CouponNotFound(_))
        ));
        // A failed checkout leaves stock untouched.
        assert_eq!(store.products().get("1").await.unwrap().unwrap().quantity, 5);
    }

    #[tokio::test]
    async fn test_checkout_empty_code_is_no_coupon() {
        let store = Store::in_memory();
        let id = seed_product(&store, 10, 5).await;
        let carts = service(&store);
        carts.add_to_cart(&alice(), id, 1).await.unwrap();

        let checkout = carts.checkout(&alice(), Some("")).await.unwrap();
        assert_eq!(checkout.coupon, None);
        assert_eq!(checkout.message(), "Checkout successful");
    }

    #[tokio::test]
    async fn test_add_rejects_overflowing_total() {
        let store = Store::in_memory();
        let price = "50000000000000000000000000000".parse().unwrap();
        let id = seed_priced(&store, price, 2).await;
        let carts = service(&store);

        let err = carts.add_to_cart(&alice(), id, 2).await.unwrap_err();
        assert!(matches!(err, CartError::AmountTooLarge));
        assert_eq!(err.to_string(), "Amount too large");
        assert!(store.carts().get("alice").await.unwrap().is_none());

        carts.add_to_cart(&alice(), id, 1).await.unwrap();
        assert!(matches!(
            carts.update_cart(&alice(), id, 2).await,
            Err(CartError::AmountTooLarge)
        ));
        let stored = store.carts().get("alice").await.unwrap().unwrap();
        assert_eq!(stored.total_price(), price);
    }

    #[tokio::test]
    async fn test_percentage_coupon_on_large_total() {
        let store = Store::in_memory();
        let id = seed_priced(&store, "10000000000000000000000000000".parse().unwrap(), 1).await;
        seed_coupon(&store, "TEN", 10, "percentage").await;
        let carts = service(&store);
        carts.add_to_cart(&alice(), id, 1).await.unwrap();

        let checkout = carts.checkout(&alice(), Some("TEN")).await.unwrap();
        assert_eq!(
            checkout.cart.discounted_price(),
            Some("9000000000000000000000000000".parse().unwrap())
        );
    }

    #[tokio::test]
    async fn test_failed_cart_write_keeps_stored_cart() {
        let backend = Arc::new(FailingCarts::default());
        let store = Store::new(backend.clone() as Arc<dyn DocumentBackend>);
        let id = seed_product(&store, 50, 5).await;
        seed_coupon(&store, "TEN", 10, "percentage").await;
        let carts = service(&store);
        carts.add_to_cart(&alice(), id, 2).await.unwrap();

        backend.fail.store(true, Ordering::SeqCst);
        assert!(matches!(
            carts.checkout(&alice(), Some("TEN")).await,
            Err(CartError::Store(_))
        ));

        // Stock is written first, the cart write is lost.
        assert_eq!(store.products().get("1").await.unwrap().unwrap().quantity, 3);
        let stored = store.carts().get("alice").await.unwrap().unwrap();
        assert!(stored.applied_coupon().is_none());
        assert_eq!(stored.discounted_price(), None);
    }

    #[tokio::test]
    async fn test_checkout_saturates_stock() {
        let store = Store::in_memory();
        let id = seed_product(&store, 10, 5).await;
        let carts = service(&store);
        carts.add_to_cart(&alice(), id, 4).await.unwrap();

        let bob = Username::parse("bob").unwrap();
        carts.add_to_cart(&bob, id, 3).await.unwrap();
        carts.checkout(&bob, None).await.unwrap();

        carts.checkout(&alice(), None).await.unwrap();
        assert_eq!(store.products().get("1").await.unwrap().unwrap().quantity, 0);
    }

    #[tokio::test]
    async fn test_carts_are_per_user() {
        let store = Store::in_memory();
        let id = seed_product(&store, 10, 5).await;
        let carts = service(&store);
        let bob = Username::parse("bob").unwrap();

        carts.add_to_cart(&alice(), id, 1).await.unwrap();
        carts.add_to_cart(&bob, id, 2).await.unwrap();

        assert_eq!(
            store.carts().get("alice").await.unwrap().unwrap().total_quantity(),
            1
        );
        assert_eq!(
            store.carts().get("bob").await.unwrap().unwrap().total_quantity(),
            2
        );
    }
}
