//! Product browsing and administration commands.

use clap::Subcommand;
use rust_decimal::Decimal;

use clementine_core::{Category, InventoryStatus, Product, ProductId};
use clementine_storefront::Shop;
use clementine_storefront::api::types::ProductRequest;
use clementine_storefront::services::{ProductFilter, SortDirection};

#[derive(Subcommand)]
pub enum ProductsAction {
    /// List products, optionally paginated and filtered
    List {
        /// Zero-indexed page number
        #[arg(long)]
        page: Option<u32>,

        /// Page size
        #[arg(long)]
        size: Option<u32>,

        /// Sort field (e.g. name, price)
        #[arg(long)]
        sort_by: Option<String>,

        /// Sort descending instead of ascending
        #[arg(long)]
        desc: bool,

        /// Filter by category
        #[arg(long)]
        category: Option<Category>,
    },
    /// Full-text search
    Search {
        /// Search terms
        query: String,
    },
    /// Show a single product
    Show {
        /// Product id
        id: i64,
    },
    /// Create a product
    Create {
        #[arg(long)]
        code: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        image: Option<String>,
        #[arg(long)]
        category: Category,
        #[arg(long)]
        price: Decimal,
        #[arg(long)]
        quantity: u32,
        /// INSTOCK, LOWSTOCK or OUTOFSTOCK
        #[arg(long, default_value = "INSTOCK")]
        status: InventoryStatus,
    },
    /// Update a product
    Update {
        /// Product id
        id: i64,
        #[arg(long)]
        code: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        image: Option<String>,
        #[arg(long)]
        category: Category,
        #[arg(long)]
        price: Decimal,
        #[arg(long)]
        quantity: u32,
        /// INSTOCK, LOWSTOCK or OUTOFSTOCK
        #[arg(long, default_value = "INSTOCK")]
        status: InventoryStatus,
    },
    /// Delete a product
    Delete {
        /// Product id
        id: i64,
    },
}

pub async fn run(shop: &Shop, action: ProductsAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ProductsAction::List {
            page,
            size,
            sort_by,
            desc,
            category,
        } => {
            let filter = ProductFilter {
                page,
                size,
                sort_by,
                sort_dir: desc.then_some(SortDirection::Desc),
                category,
                search: None,
            };
            let result = shop.catalog().fetch(&filter).await;
            for product in &result.content {
                print_product_row(product);
            }
            println!(
                "page {}/{} ({} products total)",
                result.number + 1,
                result.total_pages.max(1),
                result.total_elements
            );
        }
        ProductsAction::Search { query } => {
            let filter = ProductFilter {
                search: Some(query),
                ..ProductFilter::default()
            };
            let result = shop.catalog().fetch(&filter).await;
            for product in &result.content {
                print_product_row(product);
            }
        }
        ProductsAction::Show { id } => {
            let product = shop.catalog().get_by_id(ProductId::new(id)).await?;
            println!("{} — {}", product.name, product.code);
            println!("  category:  {}", product.category);
            println!("  price:     {}", product.price);
            println!("  stock:     {} ({})", product.quantity, product.inventory_status);
            if let Some(rating) = product.rating {
                println!("  rating:    {rating}/5");
            }
            if !product.description.is_empty() {
                println!("  {}", product.description);
            }
        }
        ProductsAction::Create {
            code,
            name,
            description,
            image,
            category,
            price,
            quantity,
            status,
        } => {
            let request = ProductRequest {
                code,
                name,
                description,
                image,
                category,
                price,
                quantity,
                internal_reference: None,
                shell_id: None,
                inventory_status: status,
                rating: None,
            };
            let product = shop.catalog().create(&request).await?;
            println!("created product {} ({})", product.id, product.name);
        }
        ProductsAction::Update {
            id,
            code,
            name,
            description,
            image,
            category,
            price,
            quantity,
            status,
        } => {
            let request = ProductRequest {
                code,
                name,
                description,
                image,
                category,
                price,
                quantity,
                internal_reference: None,
                shell_id: None,
                inventory_status: status,
                rating: None,
            };
            let product = shop.catalog().update(ProductId::new(id), &request).await?;
            println!("updated product {} ({})", product.id, product.name);
        }
        ProductsAction::Delete { id } => {
            shop.catalog().delete(ProductId::new(id)).await?;
            println!("deleted product {id}");
        }
    }
    Ok(())
}

fn print_product_row(product: &Product) {
    println!(
        "{:>6}  {:<28} {:>10}  {:<11} {}",
        product.id.to_string(),
        product.name,
        product.price.to_string(),
        product.inventory_status.to_string(),
        product.category
    );
}
