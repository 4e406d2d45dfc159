//! Lecas CLI - cart, wishlist and session tools over a local state file.
//!
//! # Usage
//!
//! ```bash
//! # Add two units of a size-M black dress with 5 left in stock
//! lecas cart add dress-1 --name "Midi dress" --price 450 --size M --color black \
//!     --quantity 2 --max-stock 5
//!
//! # Show the cart with subtotal and savings
//! lecas cart show
//!
//! # Favorite a product, then move it into the cart
//! lecas wishlist toggle tote-3 --name "Leather tote" --price 890
//! lecas wishlist move tote-3
//!
//! # Which statuses can a shipped order move to?
//! lecas order next shipped
//!
//! # Store credentials and keep them fresh until Ctrl+C
//! lecas session login --access "$ACCESS" --refresh "$REFRESH"
//! lecas session watch
//! ```
//!
//! # Commands
//!
//! - `cart` - Add, update, remove and list cart lines
//! - `wishlist` - Toggle, remove, move to cart and list favorites
//! - `order` - Inspect the order status transition table
//! - `session` - Store, inspect, refresh and clear credentials

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use rust_decimal::Decimal;

use lecas_core::OrderStatus;
use lecas_storefront::ClientConfig;

mod commands;

#[derive(Parser)]
#[command(name = "lecas")]
#[command(author, version, about = "Lecas storefront client tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage the shopping cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Manage the wishlist
    Wishlist {
        #[command(subcommand)]
        action: WishlistAction,
    },
    /// Inspect order status transitions
    Order {
        #[command(subcommand)]
        action: OrderAction,
    },
    /// Manage stored credentials
    Session {
        #[command(subcommand)]
        action: SessionAction,
    },
}

/// Product fields shared by cart and wishlist commands.
#[derive(clap::Args)]
struct ProductArgs {
    /// Product ID
    id: String,

    /// Display name
    #[arg(short, long)]
    name: String,

    /// Unit price
    #[arg(short, long)]
    price: Decimal,

    /// Pre-discount unit price
    #[arg(long)]
    original_price: Option<Decimal>,

    /// Image URL
    #[arg(long, default_value = "")]
    image: String,
}

/// Variant selector for a cart line.
#[derive(clap::Args)]
struct VariantArgs {
    /// Size variant
    #[arg(short, long)]
    size: Option<String>,

    /// Color variant
    #[arg(short, long)]
    color: Option<String>,
}

#[derive(Subcommand)]
enum CartAction {
    /// Add units of a product (merges with a matching line)
    Add {
        #[command(flatten)]
        product: ProductArgs,

        #[command(flatten)]
        variant: VariantArgs,

        /// Units to add
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,

        /// Stock ceiling for this line
        #[arg(long)]
        max_stock: Option<u32>,
    },
    /// Set the quantity of a line (0 removes it)
    Set {
        /// Product ID
        id: String,

        /// New quantity
        quantity: u32,

        #[command(flatten)]
        variant: VariantArgs,
    },
    /// Remove a line
    Remove {
        /// Product ID
        id: String,

        #[command(flatten)]
        variant: VariantArgs,
    },
    /// Remove every line
    Clear,
    /// List lines with totals
    Show,
}

#[derive(Subcommand)]
enum WishlistAction {
    /// Add a product, or remove it if already favorited
    Toggle {
        #[command(flatten)]
        product: ProductArgs,

        /// Average review rating
        #[arg(long)]
        rating: Option<f32>,

        /// Discount badge in percent
        #[arg(long)]
        discount: Option<u8>,
    },
    /// Remove a product
    Remove {
        /// Product ID
        id: String,
    },
    /// Move a product from the wishlist into the cart
    Move {
        /// Product ID
        id: String,

        /// Units to add to the cart
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },
    /// Remove every product
    Clear,
    /// List favorited products
    Show,
}

#[derive(Subcommand)]
enum OrderAction {
    /// List the statuses an order can move to
    Next {
        /// Current status (pending, processing, shipped, delivered, cancelled)
        status: OrderStatus,
    },
    /// Check whether a status change is allowed
    Check {
        /// Current status
        from: OrderStatus,

        /// Requested status
        to: OrderStatus,
    },
}

#[derive(Subcommand)]
enum SessionAction {
    /// Store credentials returned by the login endpoint
    Login {
        /// Bearer token
        #[arg(long)]
        access: String,

        /// Refresh token
        #[arg(long)]
        refresh: Option<String>,

        /// User profile JSON
        #[arg(long)]
        user: Option<String>,
    },
    /// Show the signed-in user and token lifetime
    Status,
    /// Refresh the bearer token now if it is expiring
    Refresh,
    /// Keep the bearer token fresh until interrupted
    Watch,
    /// Remove all credentials
    Logout,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "lecas_cli=info,lecas_storefront=info".into());
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> lecas_storefront::Result<()> {
    let config = ClientConfig::from_env()?;
    let app = commands::App::open(&config);

    match cli.command {
        Commands::Cart { action } => match action {
            CartAction::Add {
                product,
                variant,
                quantity,
                max_stock,
            } => commands::cart::add(&app, product, variant, quantity, max_stock)?,
            CartAction::Set {
                id,
                quantity,
                variant,
            } => commands::cart::set(&app, id, variant, quantity)?,
            CartAction::Remove { id, variant } => commands::cart::remove(&app, id, variant)?,
            CartAction::Clear => commands::cart::clear(&app)?,
            CartAction::Show => commands::cart::show(&app),
        },
        Commands::Wishlist { action } => match action {
            WishlistAction::Toggle {
                product,
                rating,
                discount,
            } => commands::wishlist::toggle(&app, product, rating, discount)?,
            WishlistAction::Remove { id } => commands::wishlist::remove(&app, id)?,
            WishlistAction::Move { id, quantity } => {
                commands::wishlist::move_to_cart(&app, id, quantity)?;
            }
            WishlistAction::Clear => commands::wishlist::clear(&app)?,
            WishlistAction::Show => commands::wishlist::show(&app),
        },
        Commands::Order { action } => match action {
            OrderAction::Next { status } => commands::order::next(status),
            OrderAction::Check { from, to } => commands::order::check(from, to)?,
        },
        Commands::Session { action } => match action {
            SessionAction::Login {
                access,
                refresh,
                user,
            } => commands::session::login(&app, access, refresh, user.as_deref())?,
            SessionAction::Status => commands::session::status(&app),
            SessionAction::Refresh => commands::session::refresh(&app, &config).await?,
            SessionAction::Watch => commands::session::watch(&app, &config).await?,
            SessionAction::Logout => commands::session::logout(&app)?,
        },
    }
    Ok(())
}
