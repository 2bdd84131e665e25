//! Parallel tool checking
//!
//! Probes run concurrently; the verdict is reported in registry order so the
//! user always sees the same first missing tool.

use std::sync::LazyLock;

use futures::future::join_all;
use kiln_core::{CommandRunner, Error, Result};
use regex::Regex;
use tracing::{debug, warn};

use crate::tool::ToolDefinition;

/// Pre-compiled regex for extracting version numbers from probe output
static VERSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"v?(\d+\.\d+(?:\.\d+)?)").expect("version regex is valid"));

/// Runs the probe of each required tool
pub struct ToolChecker<'a> {
    runner: &'a dyn CommandRunner,
}

impl<'a> ToolChecker<'a> {
    pub fn new(runner: &'a dyn CommandRunner) -> Self {
        Self { runner }
    }

    /// Check all tools in parallel, results in input order
    pub async fn check_all(&self, tools: &[ToolDefinition]) -> Vec<ToolStatus> {
        let futures: Vec<_> = tools.iter().map(|tool| self.check_tool(tool)).collect();
        join_all(futures).await
    }

    /// Fail with `MissingDependency` for the first tool that is not usable
    pub async fn ensure_available(&self, tools: &[ToolDefinition]) -> Result<()> {
        for status in self.check_all(tools).await {
            match &status.state {
                ToolState::Available => {
                    debug!(
                        "{} available ({})",
                        status.tool.name,
                        status.version.as_deref().unwrap_or("unknown version")
                    );
                }
                ToolState::Missing => {
                    return Err(Error::missing_dependency(
                        &status.tool.name,
                        status.tool.hint.as_deref(),
                    ));
                }
                ToolState::CheckFailed { reason } => {
                    warn!("Probe for {} failed: {}", status.tool.name, reason);
                    return Err(Error::missing_dependency(
                        &status.tool.name,
                        status.tool.hint.as_deref(),
                    ));
                }
            }
        }
        Ok(())
    }

    async fn check_tool(&self, tool: &ToolDefinition) -> ToolStatus {
        if tool.on_path && which::which(&tool.probe.program).is_err() {
            return ToolStatus {
                tool: tool.clone(),
                state: ToolState::Missing,
                version: None,
            };
        }

        match self.runner.run(&tool.probe, None).await {
            Ok(output) => {
                let text = if output.stdout.trim().is_empty() {
                    output.stderr
                } else {
                    output.stdout
                };
                ToolStatus {
                    tool: tool.clone(),
                    state: ToolState::Available,
                    version: parse_version(&text),
                }
            }
            Err(e) => ToolStatus {
                tool: tool.clone(),
                state: ToolState::CheckFailed {
                    reason: e.to_string(),
                },
                version: None,
            },
        }
    }
}

/// Extract a version number from probe output, e.g. "git version 2.39.0"
fn parse_version(text: &str) -> Option<String> {
    VERSION_RE
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// Outcome of probing one tool
#[derive(Debug, Clone)]
pub struct ToolStatus {
    pub tool: ToolDefinition,
    pub state: ToolState,
    pub version: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolState {
    /// Probe succeeded
    Available,
    /// Executable not found in PATH
    Missing,
    /// Probe ran but failed
    CheckFailed { reason: String },
}
