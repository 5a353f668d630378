//! CLI subcommands.

pub mod account;
pub mod cart;
pub mod contact;
pub mod products;
pub mod wishlist;
