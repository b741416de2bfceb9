//! CLI-specific functionality for the folder agent
//!
//! This module contains argument parsing, configuration discovery and the
//! console renderer used for verbose progress output.

pub mod args;
pub mod config;
pub mod console;

pub use args::{Args, Backend, OutputFormat};
pub use config::{AppConfig, ConfigDiscovery, apply_credentials};
pub use console::ConsoleEventHandler;
