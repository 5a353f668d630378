//! Wishlist commands.

use clap::Subcommand;

use clementine_core::{ItemId, ProductId};
use clementine_storefront::Shop;

#[derive(Subcommand)]
pub enum WishlistAction {
    /// Show the wishlist
    Show,
    /// Add a product
    Add {
        /// Product id
        product_id: i64,
    },
    /// Remove an entry
    Remove {
        /// Entry id (`local-<n>` while anonymous, server id otherwise)
        entry_id: ItemId,
    },
}

pub async fn run(shop: &Shop, action: WishlistAction) -> Result<(), Box<dyn std::error::Error>> {
    let wishlist = shop.wishlist();

    match action {
        WishlistAction::Show => {
            let entries = wishlist.refresh().await;
            if entries.is_empty() {
                println!("wishlist is empty");
                return Ok(());
            }
            for entry in &entries {
                println!(
                    "{:>10}  {:<28} {}",
                    entry.id.to_string(),
                    entry.product.name,
                    entry.product.price
                );
            }
            println!("{} entry(ies)", wishlist.item_count());
        }
        WishlistAction::Add { product_id } => {
            wishlist.refresh().await;
            match wishlist.add(ProductId::new(product_id)).await? {
                Some(entry) => println!("added {} (entry {})", entry.product.name, entry.id),
                None => println!("product {product_id} is not in the catalog"),
            }
        }
        WishlistAction::Remove { entry_id } => {
            wishlist.refresh().await;
            wishlist.remove(entry_id).await?;
            println!("removed entry {entry_id}");
        }
    }
    Ok(())
}
