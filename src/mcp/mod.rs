//! MCP server
//!
//! Tool surface over stdio.

mod server;

pub use server::FoodgramService;
