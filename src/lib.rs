//! hqxc - Offline compiler for HQx pixel interpolation rule tables
//!
//! This library turns human-authored rule sources, one per zoom factor, into:
//! - Dispatch source code (C or Rust) that blends neighbour colors per case
//! - Fixed-size binary offset and weight tables for texture-based lookup
//! - A reduced "lite" variant that needs a single texture fetch per sub-pixel
//!
//! The stages are independent and operate on [`table::PixelTable`] values:
//! [`parser`] → [`validate`] → [`expand`] → [`variants`] → [`emit`].
//! [`build::Pipeline`] chains them for one rule source.

pub mod build;
pub mod case;
pub mod cli;
pub mod config;
pub mod emit;
pub mod error;
pub mod expand;
pub mod parser;
pub mod table;
pub mod validate;
pub mod variants;
pub mod weights;
