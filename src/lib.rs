//! Stage Config Library
//!
//! Collects trees of YAML configuration fragments into one merged stream,
//! with stage-specific overrides selected from the environment.

pub mod cli;
pub mod config;
pub mod env;
pub mod error;
pub mod logging;

pub use config::{ConfigCollector, read_configs, read_configs_from};
pub use error::{Error, ErrorKind, Result};
