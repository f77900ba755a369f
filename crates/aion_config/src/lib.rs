//! Parsing and validation of the `aion.toml` elaboration settings.
//!
//! This crate reads the project configuration file and produces a strongly-typed
//! [`ElabConfig`] naming the root modules, the debug switches and the
//! free-form design flags handed to the elaborated design.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod types;

pub use error::ConfigError;
pub use loader::{load_config, load_config_from_str};
pub use types::*;
