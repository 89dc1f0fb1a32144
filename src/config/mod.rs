//! Configuration module for hqxc builds
//!
//! Provides types, discovery and parsing for `hqxc.toml` project configuration.

pub mod loader;
pub mod schema;

pub use loader::*;
pub use schema::*;
