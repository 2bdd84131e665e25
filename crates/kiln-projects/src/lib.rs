//! # kiln-projects
//!
//! Project bootstrap for the Kiln scaffolder providing:
//! - The bootstrap pipeline (clone, clean, install, write `.env`, roll back on failure)
//! - The animated progress indicator shown during long external commands
//! - Starter `.env` generation
//!
//! # Example
//!
//! ```no_run
//! use camino::Utf8Path;
//! use kiln_core::{KilnConfig, TokioCommandRunner};
//! use kiln_projects::{BootstrapPipeline, BootstrapRequest, IndicatorStyle, ProgressIndicator, TermSurface};
//!
//! # async fn example() {
//! let config = KilnConfig::default();
//! let indicator = ProgressIndicator::new(IndicatorStyle::dots(), TermSurface::stdout());
//! let mut pipeline = BootstrapPipeline::new(config, TokioCommandRunner::new(), indicator);
//!
//! let request = BootstrapRequest::new("my-app", Utf8Path::new("/tmp"));
//! let outcome = pipeline.run(&request).await;
//! std::process::exit(outcome.exit_code());
//! # }
//! ```

pub mod env_file;
pub mod pipeline;
pub mod progress;

pub use pipeline::{
    validate_project_name, BootstrapPipeline, BootstrapReport, BootstrapRequest, PipelineOutcome,
    Stage,
};
pub use progress::{IndicatorStyle, ProgressIndicator, Surface, TermSurface};
