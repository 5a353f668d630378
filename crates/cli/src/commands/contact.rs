//! Contact command.

use clementine_core::Email;
use clementine_storefront::Shop;
use clementine_storefront::api::types::ContactRequest;

pub async fn send(
    shop: &Shop,
    email: &str,
    message: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let request = ContactRequest {
        email: Email::parse(email)?,
        message: message.to_string(),
    };
    let response = shop.contact().send(&request).await?;
    println!("{}", response.message);
    Ok(())
}
