//! External command execution
//!
//! Every external tool the scaffolder talks to (git, the package manager,
//! the toolchain version manager) goes through [`CommandRunner`]. The runner
//! is a black box to the pipeline: it either yields the captured output or a
//! single [`Error::Command`] describing what went wrong.

use std::fmt;
use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, trace};

use crate::error::{Error, Result};

/// A program plus its arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    /// Executable name or path
    pub program: String,
    /// Arguments passed verbatim
    pub args: Vec<String>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Append a single argument
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Run `script` through a login bash shell. Needed for tools that only
    /// exist as shell functions, such as nvm.
    pub fn shell(script: impl Into<String>) -> Self {
        Self::new("bash").arg("-lc").arg(script)
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            if arg.is_empty() || arg.contains(char::is_whitespace) {
                write!(f, " \"{}\"", arg)?;
            } else {
                write!(f, " {}", arg)?;
            }
        }
        Ok(())
    }
}

/// Captured output of a successful command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Runs external commands without blocking the async scheduler
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run `command`, optionally inside `working_dir`.
    ///
    /// Resolves to the captured output when the process exits with status 0.
    /// A non-zero exit, a spawn failure, or a missing executable all resolve to
    /// [`Error::Command`]. There is no retry and no timeout.
    async fn run(&self, command: &CommandSpec, working_dir: Option<&Path>)
        -> Result<CommandOutput>;
}

/// [`CommandRunner`] backed by `tokio::process`
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioCommandRunner;

impl TokioCommandRunner {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CommandRunner for TokioCommandRunner {
    async fn run(
        &self,
        command: &CommandSpec,
        working_dir: Option<&Path>,
    ) -> Result<CommandOutput> {
        debug!("Running: {}", command);

        let mut cmd = Command::new(&command.program);
        cmd.args(&command.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        if let Some(dir) = working_dir {
            cmd.current_dir(dir);
        }

        let output = cmd
            .output()
            .await
            .map_err(|e| Error::command(command.to_string(), e.to_string()))?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        trace!("{} exited with {}", command.program, output.status);

        if !output.status.success() {
            let detail = stderr.trim();
            let cause = if detail.is_empty() {
                output.status.to_string()
            } else {
                format!("{}: {}", output.status, detail)
            };
            return Err(Error::command(command.to_string(), cause));
        }

        Ok(CommandOutput { stdout, stderr })
    }
}
