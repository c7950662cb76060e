//! Favorites Service Library
//!
//! HTTP service that toggles favorite movies per user on top of a Redis set
//! store, with optional artificial latency and canary fault injection.
//! The main binary is in `src/main.rs`.

pub mod api;
pub mod canary;
pub mod config;
pub mod error;
pub mod logging;
/// Shared handler state
pub mod state;
pub mod store;

pub use api::build_router;
