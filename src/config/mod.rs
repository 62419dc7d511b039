//! Configuration loading and management.
//!
//! This module is split into logical submodules:
//! - [`types`]: Core config struct definitions (Config, ServerConfig, ListenConfig, AccountsConfig)
//! - [`limits`]: Per-connection limits (LimitsConfig)
//! - [`validation`]: Startup checks that collect every problem at once

mod defaults;
mod limits;
mod types;
pub mod validation;

pub use limits::LimitsConfig;
pub use types::{AccountsConfig, Config, ConfigError, ListenConfig, ServerConfig};
