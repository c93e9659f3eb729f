//! Configuration loading and schema definitions
//!
//! One TOML file carries the range table, analysis settings, storage and
//! logging options.

mod loader;
mod schema;

pub use loader::{Config, CONFIG_ENV_VAR};
pub use schema::*;
