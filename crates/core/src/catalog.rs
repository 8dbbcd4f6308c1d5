//! Catalog products and stock.

use serde::{Deserialize, Serialize};

use crate::types::{Price, ProductId};

/// A product in the catalog.
///
/// `quantity` is the available stock. It only ever changes at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Sequential product ID (catalog size + 1 at creation).
    pub product_id: ProductId,
    /// Image URL.
    pub image: String,
    /// Display name.
    pub name: String,
    /// Unit price.
    pub price: Price,
    /// Units in stock.
    pub quantity: u32,
}

impl Product {
    /// Whether `quantity` units can currently be put in a cart.
    #[must_use]
    pub const fn has_stock_for(&self, quantity: u32) -> bool {
        quantity <= self.quantity
    }

    /// Remove `quantity` units from stock, stopping at zero.
    ///
    /// Returns the number of units that could not be taken.
    pub const fn take_stock(&mut self, quantity: u32) -> u32 {
        let shortfall = quantity.saturating_sub(self.quantity);
        self.quantity = self.quantity.saturating_sub(quantity);
        shortfall
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    fn product(stock: u32) -> Product {
        Product {
            product_id: ProductId::new(1),
            image: "https://img.example/widget.png".to_string(),
            name: "Widget".to_string(),
            price: Price::new(Decimal::from(10)).unwrap(),
            quantity: stock,
        }
    }

    #[test]
    fn test_has_stock_for() {
        let p = product(5);
        assert!(p.has_stock_for(5));
        assert!(!p.has_stock_for(6));
    }

    #[test]
    fn test_take_stock_exact() {
        let mut p = product(5);
        assert_eq!(p.take_stock(2), 0);
        assert_eq!(p.quantity, 3);
    }

    #[test]
    fn test_take_stock_saturates() {
        let mut p = product(2);
        assert_eq!(p.take_stock(5), 3);
        assert_eq!(p.quantity, 0);
    }

    #[test]
    fn test_json_field_names() {
        let json = serde_json::to_value(product(5)).unwrap();
        assert_eq!(json["productId"], 1);
        assert_eq!(json["name"], "Widget");
        assert_eq!(json["quantity"], 5);
    }
}
