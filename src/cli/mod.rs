//! Command line interface logic

pub mod import;

pub use import::{ImportArgs, run_import_mode};
