//! # domains
//!
//! The central domain logic and interface definitions for the relay bot:
//! models, errors, and the ports the adapter crates plug into.

pub mod error;
pub mod models;
pub mod ports;

// Re-exporting for easier access in other crates
pub use error::*;
pub use models::*;
pub use ports::*;
