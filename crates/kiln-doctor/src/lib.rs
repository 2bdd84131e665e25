//! Kiln Doctor - required tool detection
//!
//! Before the scaffolder touches the filesystem it makes sure the external
//! tools it is about to drive are present and answer a version query:
//!
//! - **git** for cloning the template repository
//! - **the package manager** (yarn by default) for installing dependencies
//! - **the toolchain version manager** (nvm by default), when enabled
//!
//! # Example
//!
//! ```rust,no_run
//! use kiln_core::{KilnConfig, TokioCommandRunner};
//! use kiln_doctor::{required_tools, ToolChecker};
//!
//! # async fn example() -> kiln_core::Result<()> {
//! let config = KilnConfig::default();
//! let runner = TokioCommandRunner::new();
//! let checker = ToolChecker::new(&runner);
//! checker.ensure_available(&required_tools(&config)).await?;
//! # Ok(())
//! # }
//! ```

mod checker;
mod registry;
mod tool;

pub use checker::{ToolChecker, ToolState, ToolStatus};
pub use registry::required_tools;
pub use tool::{ToolCategory, ToolDefinition};
