//! jvdeps CLI.
//!
//! - [`cli`] - argument definitions (clap derive)
//! - [`commands`] - `resolve`, `parse` and `config`
//! - [`error`] - [`CliError`] and its `miette` rendering
//! - [`logger`] - `tracing-subscriber` setup
//! - [`ui`] - colored terminal output

pub mod cli;
pub mod commands;
pub mod error;
pub mod logger;
pub mod ui;

pub use error::{CliError, Result};
