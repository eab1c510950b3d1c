//! Command-line interface definitions and helpers.
//!
//! This module contains all CLI argument parsing, settings resolution, and
//! subcommand handlers.

mod args;
mod commands;
mod settings;

pub use args::{parse_resolution, Args, Command, ConfigAction};
pub use commands::{check, handle_config_action, run_detector};
pub use settings::Settings;
