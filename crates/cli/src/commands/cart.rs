//! Cart commands.
//!
//! # Usage
//!
//! ```bash
//! lecas cart add tee-9 --name "Cotton tee" --price 12.5 --quantity 3
//! lecas cart set tee-9 1
//! lecas cart remove dress-1 --size M --color black
//! lecas cart show
//! ```

use lecas_core::{CartItem, LineKey, Price, ProductId};
use lecas_storefront::Error;
use tracing::{info, warn};

use super::App;
use crate::{ProductArgs, VariantArgs};

fn line_key(id: String, variant: VariantArgs) -> LineKey {
    LineKey::new(id, variant.size, variant.color)
}

/// Add `quantity` units of a product.
///
/// # Errors
///
/// Returns `Error::InvalidInput` if the stock ceiling refuses the change, or
/// `Error::Storage` if the cart cannot be written.
pub fn add(
    app: &App,
    product: ProductArgs,
    variant: VariantArgs,
    quantity: u32,
    max_stock: Option<u32>,
) -> Result<(), Error> {
    if quantity == 0 {
        return Err(Error::InvalidInput("quantity must be at least 1".to_string()));
    }

    let item = CartItem {
        id: ProductId::new(product.id),
        name: product.name,
        image: product.image,
        price: Price::new(product.price),
        original_price: product.original_price.map(Price::new),
        quantity,
        size: variant.size,
        color: variant.color,
        max_stock,
    };
    let name = item.name.clone();

    if !app.cart.add(item, quantity)? {
        warn!(product = %name, quantity, "Not enough stock");
        return Err(Error::InvalidInput(format!(
            "only limited stock is available for {name}"
        )));
    }

    info!(product = %name, quantity, count = app.cart.count(), "Added to cart");
    Ok(())
}

/// Set the quantity of a line.
///
/// # Errors
///
/// Returns `Error::InvalidInput` if the line is missing or the stock ceiling
/// refuses the change, or `Error::Storage` if the cart cannot be written.
pub fn set(app: &App, id: String, variant: VariantArgs, quantity: u32) -> Result<(), Error> {
    let key = line_key(id, variant);
    if !app.cart.set_quantity(&key, quantity)? {
        return Err(Error::InvalidInput(match app.cart.line(&key) {
            Some(line) => format!(
                "{} has only {} in stock",
                line.name,
                line.max_stock.unwrap_or(line.quantity)
            ),
            None => format!("{} is not in the cart", key.id),
        }));
    }

    info!(product = %key.id, quantity, count = app.cart.count(), "Updated cart");
    Ok(())
}

/// Remove a line.
///
/// # Errors
///
/// Returns `Error::Storage` if the cart cannot be written.
pub fn remove(app: &App, id: String, variant: VariantArgs) -> Result<(), Error> {
    let key = line_key(id, variant);
    if app.cart.remove(&key)? {
        info!(product = %key.id, "Removed from cart");
    } else {
        warn!(product = %key.id, "Not in cart");
    }
    Ok(())
}

/// Remove every line.
///
/// # Errors
///
/// Returns `Error::Storage` if the cart cannot be written.
pub fn clear(app: &App) -> Result<(), Error> {
    app.cart.clear()?;
    info!("Cart cleared");
    Ok(())
}

/// Print the cart.
#[allow(clippy::print_stdout)]
pub fn show(app: &App) {
    let items = app.cart.items();
    if items.is_empty() {
        println!("Cart is empty");
        return;
    }

    for line in &items {
        let variant = [line.size.as_deref(), line.color.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" / ");
        println!(
            "{:>3} x {:<32} {:<12} {:>10}",
            line.quantity,
            line.name,
            variant,
            line.line_total().to_string()
        );
    }

    println!();
    println!("Items:    {}", app.cart.count());
    println!("Subtotal: {}", app.cart.subtotal());
    let discount = app.cart.discount();
    if !discount.is_zero() {
        println!("Savings:  {discount}");
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use lecas_storefront::MemoryStore;
    use rust_decimal::Decimal;

    use super::*;

    fn app() -> App {
        App::with_storage(Arc::new(MemoryStore::new()))
    }

    fn product(id: &str) -> ProductArgs {
        ProductArgs {
            id: id.to_string(),
            name: "Cotton tee".to_string(),
            price: Decimal::new(1250, 2),
            original_price: None,
            image: String::new(),
        }
    }

    fn variant(size: Option<&str>) -> VariantArgs {
        VariantArgs {
            size: size.map(str::to_string),
            color: None,
        }
    }

    #[test]
    fn test_add_then_set_and_remove() {
        let app = app();
        add(&app, product("tee"), variant(Some("M")), 2, None).unwrap();
        add(&app, product("tee"), variant(Some("M")), 1, None).unwrap();
        assert_eq!(app.cart.count(), 3);

        set(&app, "tee".to_string(), variant(Some("M")), 1).unwrap();
        assert_eq!(app.cart.count(), 1);

        remove(&app, "tee".to_string(), variant(Some("M"))).unwrap();
        assert!(app.cart.is_empty());
    }

    #[test]
    fn test_add_over_ceiling_is_invalid_input() {
        let app = app();
        let err = add(&app, product("tee"), variant(None), 3, Some(2)).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
        assert!(app.cart.is_empty());
    }

    #[test]
    fn test_set_missing_line_is_invalid_input() {
        let app = app();
        let err = set(&app, "ghost".to_string(), variant(None), 2).unwrap_err();
        assert_eq!(err.to_string(), "Invalid input: ghost is not in the cart");
    }

    #[test]
    fn test_add_zero_is_rejected() {
        let app = app();
        assert!(add(&app, product("tee"), variant(None), 0, None).is_err());
    }
}
