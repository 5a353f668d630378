//! Cart commands.

use clap::Subcommand;

use clementine_core::{ItemId, ProductId, Quantity};
use clementine_storefront::Shop;

#[derive(Subcommand)]
pub enum CartAction {
    /// Show the cart
    Show,
    /// Add a product
    Add {
        /// Product id
        product_id: i64,

        /// Quantity; anything unparsable counts as 1
        #[arg(short, long, default_value = "1")]
        quantity: Quantity,
    },
    /// Change a line's quantity
    Update {
        /// Line id (`local-<n>` while anonymous, server id otherwise)
        line_id: ItemId,

        /// New quantity; anything unparsable counts as 1
        quantity: Quantity,
    },
    /// Remove a line
    Remove {
        /// Line id (`local-<n>` while anonymous, server id otherwise)
        line_id: ItemId,
    },
    /// Empty the cart
    Clear,
}

pub async fn run(shop: &Shop, action: CartAction) -> Result<(), Box<dyn std::error::Error>> {
    let cart = shop.cart();

    match action {
        CartAction::Show => {
            let lines = cart.refresh().await;
            if lines.is_empty() {
                println!("cart is empty");
                return Ok(());
            }
            for line in &lines {
                println!(
                    "{:>10}  {:<28} x{:<3} @ {}",
                    line.id.to_string(),
                    line.product.name,
                    line.quantity,
                    line.product.price
                );
            }
            println!("{} item(s) in cart", cart.item_count());
        }
        CartAction::Add {
            product_id,
            quantity,
        } => {
            cart.refresh().await;
            match cart.add(ProductId::new(product_id), quantity).await? {
                Some(line) => println!(
                    "added {} x{} (line {})",
                    line.product.name, line.quantity, line.id
                ),
                None => println!("product {product_id} is not in the catalog"),
            }
        }
        CartAction::Update { line_id, quantity } => {
            cart.refresh().await;
            match cart.update_quantity(line_id, quantity).await? {
                Some(line) => println!("line {} now x{}", line.id, line.quantity),
                None => println!("no such line: {line_id}"),
            }
        }
        CartAction::Remove { line_id } => {
            cart.refresh().await;
            cart.remove(line_id).await?;
            println!("removed line {line_id}");
        }
        CartAction::Clear => {
            cart.clear().await?;
            println!("cart cleared");
        }
    }
    Ok(())
}
