//! Clementine CLI - drive the storefront from the terminal.
//!
//! # Usage
//!
//! ```bash
//! # Browse the catalog
//! clem products list --page 0 --size 10 --sort-by name
//! clem products search "watch"
//!
//! # Shop anonymously; state is kept in the local store file
//! clem cart add 1000 --quantity 2
//! clem cart show
//! clem wishlist add 1002
//!
//! # Log in; the local cart and wishlist merge into the account
//! clem account login -e jane@shop.test -p secret
//! clem cart show
//! ```
//!
//! # Commands
//!
//! - `products` - list, search, show, create, update, delete
//! - `cart` - show, add, update, remove, clear
//! - `wishlist` - show, add, remove
//! - `account` - register, login, logout, whoami
//! - `contact` - send a contact message

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(clippy::print_stdout)]

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use clementine_storefront::Shop;
use clementine_storefront::config::ShopConfig;

mod commands;

/// Store file used when `CLEMENTINE_STORAGE` is unset; one-shot CLI
/// invocations need durable state between runs.
const DEFAULT_STORE_FILE: &str = ".clementine.json";

#[derive(Parser)]
#[command(name = "clem")]
#[command(author, version, about = "Clementine storefront CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse and manage products
    Products {
        #[command(subcommand)]
        action: commands::products::ProductsAction,
    },
    /// Manage the shopping cart
    Cart {
        #[command(subcommand)]
        action: commands::cart::CartAction,
    },
    /// Manage the wishlist
    Wishlist {
        #[command(subcommand)]
        action: commands::wishlist::WishlistAction,
    },
    /// Register, log in and out, show the current user
    Account {
        #[command(subcommand)]
        action: commands::account::AccountAction,
    },
    /// Send a contact message
    Contact {
        /// Sender email address
        #[arg(short, long)]
        email: String,

        /// Message body
        #[arg(short, long)]
        message: String,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = ShopConfig::from_env()?;
    if config.storage_path.is_none() {
        config.storage_path = Some(PathBuf::from(DEFAULT_STORE_FILE));
    }
    let shop = Shop::new(config)?;

    match cli.command {
        Commands::Products { action } => commands::products::run(&shop, action).await?,
        Commands::Cart { action } => commands::cart::run(&shop, action).await?,
        Commands::Wishlist { action } => commands::wishlist::run(&shop, action).await?,
        Commands::Account { action } => commands::account::run(&shop, action).await?,
        Commands::Contact { email, message } => {
            commands::contact::send(&shop, &email, &message).await?;
        }
    }
    Ok(())
}
