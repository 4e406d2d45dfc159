//! Wishlist commands.

use chrono::Utc;
use lecas_core::{Price, ProductId, WishlistItem};
use lecas_storefront::Error;
use tracing::{info, warn};

use super::App;
use crate::ProductArgs;

/// Favorite a product, or unfavorite it if it is already saved.
///
/// # Errors
///
/// Returns `Error::InvalidInput` for a rating outside 0-5 or a discount over
/// 100, or `Error::Storage` if the wishlist cannot be written.
pub fn toggle(
    app: &App,
    product: ProductArgs,
    rating: Option<f32>,
    discount: Option<u8>,
) -> Result<(), Error> {
    if rating.is_some_and(|r| !(0.0..=5.0).contains(&r)) {
        return Err(Error::InvalidInput("rating must be between 0 and 5".to_string()));
    }
    if discount.is_some_and(|d| d > 100) {
        return Err(Error::InvalidInput("discount must be at most 100".to_string()));
    }

    let item = WishlistItem {
        id: ProductId::new(product.id),
        name: product.name,
        image: product.image,
        price: Price::new(product.price),
        original_price: product.original_price.map(Price::new),
        rating,
        discount,
        added_at: Utc::now(),
    };
    let name = item.name.clone();

    if app.wishlist.toggle(item)? {
        info!(product = %name, count = app.wishlist.count(), "Added to wishlist");
    } else {
        info!(product = %name, count = app.wishlist.count(), "Removed from wishlist");
    }
    Ok(())
}

/// Unfavorite a product.
///
/// # Errors
///
/// Returns `Error::Storage` if the wishlist cannot be written.
pub fn remove(app: &App, id: String) -> Result<(), Error> {
    let id = ProductId::new(id);
    if app.wishlist.remove(&id)? {
        info!(product = %id, "Removed from wishlist");
    } else {
        warn!(product = %id, "Not in wishlist");
    }
    Ok(())
}

/// Move a product from the wishlist into the cart.
///
/// If the cart refuses the line, the product goes back on the wishlist.
///
/// # Errors
///
/// Returns `Error::InvalidInput` if the product is not favorited or the cart
/// refuses it, or `Error::Storage` if either store cannot be written.
pub fn move_to_cart(app: &App, id: String, quantity: u32) -> Result<(), Error> {
    if quantity == 0 {
        return Err(Error::InvalidInput("quantity must be at least 1".to_string()));
    }

    let id = ProductId::new(id);
    let Some(item) = app.wishlist.move_to_cart(&id)? else {
        return Err(Error::InvalidInput(format!("{id} is not in the wishlist")));
    };

    if !app.cart.add(item.clone().into_cart_item(quantity), quantity)? {
        app.wishlist.add(item)?;
        return Err(Error::InvalidInput(format!(
            "cart could not take {quantity} more of {id}"
        )));
    }

    info!(product = %id, quantity, cart_count = app.cart.count(), "Moved to cart");
    Ok(())
}

/// Remove every product.
///
/// # Errors
///
/// Returns `Error::Storage` if the wishlist cannot be written.
pub fn clear(app: &App) -> Result<(), Error> {
    app.wishlist.clear()?;
    info!("Wishlist cleared");
    Ok(())
}

/// Print the wishlist, most recently favorited first.
#[allow(clippy::print_stdout)]
pub fn show(app: &App) {
    let mut items = app.wishlist.items();
    if items.is_empty() {
        println!("Wishlist is empty");
        return;
    }

    items.sort_by(|a, b| b.added_at.cmp(&a.added_at));
    for item in &items {
        let badge = item
            .discount
            .map(|d| format!("-{d}%"))
            .unwrap_or_default();
        println!(
            "{:<16} {:<32} {:>10} {:>5}  {}",
            item.id,
            item.name,
            item.price.to_string(),
            badge,
            item.added_at.format("%Y-%m-%d %H:%M")
        );
    }
    println!();
    println!("Saved: {}", items.len());
}
