//! Configuration management for the importer
//!
//! This module handles loading and layering configuration settings for
//! both library embedders and the CLI.

pub mod loader;
pub mod settings;

pub use loader::ConfigLoader;
pub use settings::Settings;
