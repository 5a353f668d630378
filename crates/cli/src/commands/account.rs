//! Account commands.

use clap::Subcommand;

use clementine_core::Email;
use clementine_storefront::Shop;
use clementine_storefront::api::types::{LoginRequest, RegisterRequest};

#[derive(Subcommand)]
pub enum AccountAction {
    /// Create an account
    Register {
        #[arg(short, long)]
        username: String,

        #[arg(short, long)]
        firstname: String,

        #[arg(short, long)]
        email: Email,

        #[arg(short, long)]
        password: String,
    },
    /// Log in; the anonymous cart and wishlist merge into the account
    Login {
        #[arg(short, long)]
        email: Email,

        #[arg(short, long)]
        password: String,
    },
    /// Log out; purely local, no network round-trip
    Logout,
    /// Show the current user
    Whoami,
}

pub async fn run(shop: &Shop, action: AccountAction) -> Result<(), Box<dyn std::error::Error>> {
    let session = shop.session();

    match action {
        AccountAction::Register {
            username,
            firstname,
            email,
            password,
        } => {
            session
                .register(&RegisterRequest {
                    username,
                    firstname,
                    email: email.clone(),
                    password,
                })
                .await?;
            println!("account created for {email}");
        }
        AccountAction::Login { email, password } => {
            session.login(&LoginRequest { email, password }).await?;

            // One-shot process: run the login transition inline instead
            // of through spawned listeners, so the merge completes
            // before we exit.
            shop.cart().on_auth_changed(true).await;
            shop.wishlist().on_auth_changed(true).await;

            match session.current_user_email() {
                Some(email) => println!("logged in as {email}"),
                None => println!("logged in"),
            }
            println!("{} item(s) in cart", shop.cart().item_count());
        }
        AccountAction::Logout => {
            session.logout()?;
            shop.cart().on_auth_changed(false).await;
            shop.wishlist().on_auth_changed(false).await;
            println!("logged out");
        }
        AccountAction::Whoami => match session.current_user_email() {
            Some(email) => println!("{email}"),
            None => println!("not logged in"),
        },
    }
    Ok(())
}
