//! Configuration loading and management.
//!
//! This module is split into logical submodules:
//! - [`types`]: Config struct definitions and loading (Config, ServerConfig, BotConfig, IgdbConfig)
//! - [`defaults`]: serde default value functions
//! - [`validation`]: startup validation that reports every problem at once

mod defaults;
mod types;
mod validation;

pub use types::{BotConfig, Config, ConfigError, IgdbConfig, ServerConfig};
pub use validation::{ValidationError, validate};
