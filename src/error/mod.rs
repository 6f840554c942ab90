//! Error handling for the importer
//!
//! This module defines error types and handling patterns used throughout the library.

pub mod types;

pub use types::{Error, Result};
