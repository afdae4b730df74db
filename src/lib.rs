//! Foodgram Library
//!
//! Recipe sharing backend: catalog, recipes, favourites, subscriptions and the
//! shopping list aggregated from a user's planned recipes.

pub mod build_info;
pub mod config;
pub mod db;
pub mod http;
pub mod mcp;
pub mod models;
pub mod shopping;
pub mod tools;
