//! Configuration system for the par-nvim GUI bridge.
//!
//! The configuration file is optional; every field has a default. It holds
//! the editor executable, extra arguments forwarded to it, the initial GUI
//! state requested at startup (font, linespace, mouse hiding, window mode)
//! and the log level.

pub mod config;
pub mod defaults;
mod error;
mod types;

pub use config::Config;
pub use error::ConfigError;
pub use types::LogLevel;
