//! MiniKit gateway library.
//!
//! Verifies developer API keys, gates notification sending by team, and
//! proxies calls to the internal notification and payments backends.

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod services;
