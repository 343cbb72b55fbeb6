//! Shared types and utilities for sectormap.
//!
//! This crate provides common functionality used across all sectormap crates:
//! - Filename encoding safe for object names and label values
//! - Shared constants (sector size, label keys, data-field keys)
//! - Shared error types

pub mod constants;
pub mod encoding;
pub mod error;

// Re-export commonly used items at crate root
pub use constants::*;
pub use encoding::{decode_name, encode_name};
pub use error::CodecError;
