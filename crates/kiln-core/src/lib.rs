//! # kiln-core
//!
//! Core library for the Kiln scaffolder providing:
//! - Configuration file parsing (kiln.yaml) with built-in defaults
//! - The shared error taxonomy used by every pipeline stage
//! - Asynchronous external command execution behind the `CommandRunner` trait

pub mod config;
pub mod error;
pub mod process;

pub use config::KilnConfig;
pub use error::{Error, Result};
pub use process::{CommandOutput, CommandRunner, CommandSpec, TokioCommandRunner};
