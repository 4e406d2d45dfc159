//! Wishlist records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::cart::CartItem;
use super::id::ProductId;
use super::price::Price;

/// A favorited product. Unique by `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistItem {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub image: String,
    pub price: Price,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_price: Option<Price>,
    /// Average review rating (0-5).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f32>,
    /// Discount badge, in percent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount: Option<u8>,
    /// When the item was favorited.
    #[serde(default = "Utc::now")]
    pub added_at: DateTime<Utc>,
}

impl WishlistItem {
    /// Build a variantless cart line from this record.
    #[must_use]
    pub fn into_cart_item(self, quantity: u32) -> CartItem {
        CartItem {
            id: self.id,
            name: self.name,
            image: self.image,
            price: self.price,
            original_price: self.original_price,
            quantity,
            size: None,
            color: None,
            max_stock: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    #[test]
    fn test_into_cart_item_keeps_pricing() {
        let item = WishlistItem {
            id: ProductId::new("w1"),
            name: "Wool coat".to_string(),
            image: String::new(),
            price: Price::new(Decimal::new(300, 0)),
            original_price: Some(Price::new(Decimal::new(400, 0))),
            rating: Some(4.5),
            discount: Some(25),
            added_at: Utc::now(),
        };

        let line = item.into_cart_item(2);
        assert_eq!(line.id.as_str(), "w1");
        assert_eq!(line.quantity, 2);
        assert_eq!(line.original_price, Some(Price::new(Decimal::new(400, 0))));
        assert!(line.size.is_none() && line.color.is_none());
    }

    #[test]
    fn test_missing_added_at_defaults() {
        let json = r#"{"id":"w2","name":"Belt","price":20}"#;
        let item: WishlistItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.id.as_str(), "w2");
        assert!(item.rating.is_none());
    }
}
