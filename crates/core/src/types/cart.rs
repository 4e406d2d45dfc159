//! Cart line items.
//!
//! A line item is keyed by product identity plus its variant discriminators
//! (size and color). Two entries for the same product in different sizes are
//! different lines.

use serde::{Deserialize, Serialize};

use super::id::ProductId;
use super::price::Price;

/// Identity of a cart line: product plus variant.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LineKey {
    /// Product identity.
    pub id: ProductId,
    /// Size variant, if the product has sizes.
    pub size: Option<String>,
    /// Color variant, if the product has colors.
    pub color: Option<String>,
}

impl LineKey {
    /// Create a key for a specific variant.
    #[must_use]
    pub fn new(id: impl Into<ProductId>, size: Option<String>, color: Option<String>) -> Self {
        Self {
            id: id.into(),
            size,
            color,
        }
    }

    /// Create a key for a product without variants.
    #[must_use]
    pub fn product(id: impl Into<ProductId>) -> Self {
        Self::new(id, None, None)
    }
}

/// A line item in the shopping cart.
///
/// Field names follow the camelCase layout the browser persisted under
/// `lecas_cart`, so carts written by the web storefront load unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    /// Product identity.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Image URL or path.
    #[serde(default)]
    pub image: String,
    /// Unit selling price.
    pub price: Price,
    /// Pre-discount unit price, when the product is on sale.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_price: Option<Price>,
    /// Number of units (always positive for stored lines).
    pub quantity: u32,
    /// Size variant.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    /// Color variant.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Stock ceiling from inventory data.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_stock: Option<u32>,
}

impl CartItem {
    /// The line identity of this item.
    #[must_use]
    pub fn key(&self) -> LineKey {
        LineKey {
            id: self.id.clone(),
            size: self.size.clone(),
            color: self.color.clone(),
        }
    }

    /// Whether this line has the given identity.
    #[must_use]
    pub fn matches(&self, key: &LineKey) -> bool {
        self.id == key.id && self.size == key.size && self.color == key.color
    }

    /// Whether `quantity` would exceed this line's stock ceiling.
    ///
    /// Lines without a ceiling never exceed.
    #[must_use]
    pub fn exceeds_stock(&self, quantity: u32) -> bool {
        self.max_stock.is_some_and(|max| quantity > max)
    }

    /// Unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price.times(self.quantity)
    }

    /// Savings against the original price for the whole line.
    #[must_use]
    pub fn line_discount(&self) -> Price {
        self.original_price.map_or(Price::ZERO, |original| {
            original.saturating_sub(self.price).times(self.quantity)
        })
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    fn item(quantity: u32) -> CartItem {
        CartItem {
            id: ProductId::new("p1"),
            name: "Linen shirt".to_string(),
            image: "/img/p1.jpg".to_string(),
            price: Price::new(Decimal::new(80, 0)),
            original_price: Some(Price::new(Decimal::new(100, 0))),
            quantity,
            size: Some("M".to_string()),
            color: Some("white".to_string()),
            max_stock: Some(5),
        }
    }

    #[test]
    fn test_matches_requires_full_variant() {
        let line = item(1);
        assert!(line.matches(&LineKey::new(
            "p1",
            Some("M".to_string()),
            Some("white".to_string())
        )));
        assert!(!line.matches(&LineKey::new(
            "p1",
            Some("L".to_string()),
            Some("white".to_string())
        )));
        assert!(!line.matches(&LineKey::product("p1")));
    }

    #[test]
    fn test_line_totals() {
        let line = item(3);
        assert_eq!(line.line_total(), Price::new(Decimal::new(240, 0)));
        assert_eq!(line.line_discount(), Price::new(Decimal::new(60, 0)));
    }

    #[test]
    fn test_exceeds_stock() {
        let line = item(1);
        assert!(!line.exceeds_stock(5));
        assert!(line.exceeds_stock(6));

        let unlimited = CartItem {
            max_stock: None,
            ..item(1)
        };
        assert!(!unlimited.exceeds_stock(u32::MAX));
    }

    #[test]
    fn test_reads_browser_layout() {
        let json = r#"{
            "id": "p9",
            "name": "Silk scarf",
            "image": "/img/p9.jpg",
            "price": 45,
            "originalPrice": 60,
            "quantity": 2,
            "color": "red",
            "maxStock": 4
        }"#;
        let line: CartItem = serde_json::from_str(json).unwrap();
        assert_eq!(line.id.as_str(), "p9");
        assert_eq!(line.size, None);
        assert_eq!(line.max_stock, Some(4));
        assert_eq!(line.line_discount(), Price::new(Decimal::new(30, 0)));
    }
}
