//! Bootstrap pipeline
//!
//! Creates a project from the template repository as a linear state machine:
//!
//! ```text
//! Validating -> CheckingTooling -> CreatingDirectory -> Cloning -> Cleaning
//!     -> InstallingDependencies -> WritingEnv -> Done
//! ```
//!
//! Any stage may move to `Failed`. Once the target directory exists, failing
//! removes it again so the user never has to clean up by hand. Cleanup of
//! installer artifacts is the one stage whose failures are only reported.

use std::fmt;
use std::future::Future;
use std::io::ErrorKind;
use std::sync::LazyLock;

use camino::{Utf8Path, Utf8PathBuf};
use kiln_core::{CommandRunner, CommandSpec, Error, KilnConfig, Result};
use kiln_doctor::{required_tools, ToolChecker, ToolDefinition};
use regex::Regex;
use tracing::{debug, info, warn};

use crate::env_file::{self, ENV_FILE_NAME};
use crate::progress::{ProgressIndicator, Surface};

/// Letters, digits, '.', '_' and '-', not starting with punctuation
static PROJECT_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._-]*$").expect("project name regex is valid")
});

const CLONE_TITLE: &str = "Downloading files...";
const CLEANUP_TITLE: &str = "Removing setup files and packages...";
const INSTALL_TITLE: &str = "Installing project dependencies...";

/// What to create and where
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapRequest {
    project_name: String,
    target_directory: Utf8PathBuf,
}

impl BootstrapRequest {
    /// Request for `<parent>/<project_name>`
    pub fn new(project_name: impl Into<String>, parent: &Utf8Path) -> Self {
        let project_name = project_name.into();
        let target_directory = parent.join(&project_name);
        Self {
            project_name,
            target_directory,
        }
    }

    /// Build from the positional command-line argument
    pub fn from_args(project_name: Option<String>, parent: &Utf8Path) -> Result<Self> {
        match project_name {
            Some(name) if !name.trim().is_empty() => Ok(Self::new(name, parent)),
            _ => Err(Error::MissingArgument),
        }
    }

    pub fn project_name(&self) -> &str {
        &self.project_name
    }

    pub fn target_directory(&self) -> &Utf8Path {
        &self.target_directory
    }
}

/// Pipeline states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Validating,
    CheckingTooling,
    CreatingDirectory,
    Cloning,
    Cleaning,
    InstallingDependencies,
    WritingEnv,
    Done,
    Failed,
}

impl Stage {
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Validating => "validating input",
            Self::CheckingTooling => "checking required tools",
            Self::CreatingDirectory => "creating project directory",
            Self::Cloning => "downloading template",
            Self::Cleaning => "removing setup files",
            Self::InstallingDependencies => "installing dependencies",
            Self::WritingEnv => "writing environment file",
            Self::Done => "done",
            Self::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Details of a finished project
#[derive(Debug)]
pub struct BootstrapReport {
    pub project_name: String,
    pub project_dir: Utf8PathBuf,
    /// Non-fatal `CleanupFailure`s from the cleaning stage
    pub cleanup_failures: Vec<Error>,
    /// `.env` keys the user still has to fill in
    pub placeholders: Vec<(&'static str, String)>,
}

/// Terminal result of one run
#[derive(Debug)]
pub enum PipelineOutcome {
    Success(BootstrapReport),
    Failure { reason: Error, stage: Stage },
}

impl PipelineOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Process exit code: 0 on success, 1 on every failure including an
    /// interrupt
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Success(_) => 0,
            Self::Failure { .. } => 1,
        }
    }
}

/// Drives one project bootstrap
pub struct BootstrapPipeline<R: CommandRunner, S: Surface> {
    config: KilnConfig,
    runner: R,
    indicator: ProgressIndicator<S>,
    tools: Vec<ToolDefinition>,
    stage: Stage,
    created: bool,
}

impl<R: CommandRunner, S: Surface> BootstrapPipeline<R, S> {
    pub fn new(config: KilnConfig, runner: R, indicator: ProgressIndicator<S>) -> Self {
        let tools = required_tools(&config);
        Self {
            config,
            runner,
            indicator,
            tools,
            stage: Stage::Validating,
            created: false,
        }
    }

    /// Replace the probed tool list
    pub fn with_tools(mut self, tools: Vec<ToolDefinition>) -> Self {
        self.tools = tools;
        self
    }

    /// Current (or final) state
    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn indicator(&self) -> &ProgressIndicator<S> {
        &self.indicator
    }

    /// Run every stage to completion
    pub async fn run(&mut self, request: &BootstrapRequest) -> PipelineOutcome {
        self.run_until(request, std::future::pending()).await
    }

    /// Run every stage unless `cancel` resolves first. Cancellation drops the
    /// in-flight stage (killing its child process) and rolls back like any
    /// other failure.
    pub async fn run_until<C>(&mut self, request: &BootstrapRequest, cancel: C) -> PipelineOutcome
    where
        C: Future<Output = ()>,
    {
        self.stage = Stage::Validating;
        self.created = false;

        let result = {
            let steps = self.execute(request);
            tokio::pin!(steps);
            tokio::select! {
                result = &mut steps => result,
                _ = cancel => Err(Error::Interrupted),
            }
        };

        match result {
            Ok(report) => {
                self.enter(Stage::Done);
                PipelineOutcome::Success(report)
            }
            Err(reason) => self.fail(request, reason).await,
        }
    }

    async fn execute(&mut self, request: &BootstrapRequest) -> Result<BootstrapReport> {
        let name = request.project_name();
        let target = request.target_directory();

        self.enter(Stage::Validating);
        validate_project_name(name)?;
        if path_exists(target).await {
            return Err(Error::target_exists(target.as_str()));
        }

        self.enter(Stage::CheckingTooling);
        if !self.tools.is_empty() {
            ToolChecker::new(&self.runner)
                .ensure_available(&self.tools)
                .await?;
        }

        self.enter(Stage::CreatingDirectory);
        tokio::fs::create_dir(target).await.map_err(|e| {
            if e.kind() == ErrorKind::AlreadyExists {
                Error::target_exists(target.as_str())
            } else {
                Error::Io(e)
            }
        })?;
        self.created = true;

        self.enter(Stage::Cloning);
        let clone = self.clone_command(target);
        spin(&mut self.indicator, CLONE_TITLE, self.runner.run(&clone, None)).await?;

        self.enter(Stage::Cleaning);
        let cleanup_failures = spin(
            &mut self.indicator,
            CLEANUP_TITLE,
            clean(&self.config, &self.runner, target),
        )
        .await;
        for failure in &cleanup_failures {
            debug!("{}", failure);
        }

        self.enter(Stage::InstallingDependencies);
        let install = self.config.install_command();
        spin(
            &mut self.indicator,
            INSTALL_TITLE,
            self.runner.run(&install, Some(target.as_std_path())),
        )
        .await?;

        self.enter(Stage::WritingEnv);
        env_file::write(&target.join(ENV_FILE_NAME), name).await?;

        info!("Project {} created at {}", name, target);
        Ok(BootstrapReport {
            project_name: name.to_string(),
            project_dir: target.to_path_buf(),
            cleanup_failures,
            placeholders: env_file::placeholders(name),
        })
    }

    fn clone_command(&self, target: &Utf8Path) -> CommandSpec {
        CommandSpec::new("git")
            .arg("clone")
            .arg("--depth")
            .arg(self.config.template.depth.to_string())
            .arg(&self.config.template.repository)
            .arg(target.as_str())
            .arg("--quiet")
    }

    fn enter(&mut self, stage: Stage) {
        debug!("Stage: {}", stage);
        self.stage = stage;
    }

    async fn fail(&mut self, request: &BootstrapRequest, reason: Error) -> PipelineOutcome {
        let stage = self.stage;
        self.indicator.stop().await;

        if self.created {
            self.rollback(request.target_directory()).await;
        }

        debug!("Failed while {}: {}", stage, reason);
        self.stage = Stage::Failed;
        PipelineOutcome::Failure { reason, stage }
    }

    async fn rollback(&mut self, target: &Utf8Path) {
        info!("Rolling back: removing {}", target);
        match tokio::fs::remove_dir_all(target).await {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => warn!("Could not remove {}: {}", target, e),
        }
        self.created = false;
    }
}

/// Run `work` with the indicator animating `title`. The indicator starts
/// before `work` is first polled and stops after it resolves.
async fn spin<S, F>(indicator: &mut ProgressIndicator<S>, title: &str, work: F) -> F::Output
where
    S: Surface,
    F: Future,
{
    indicator.start(title).await;
    let output = work.await;
    indicator.stop().await;
    output
}

/// Remove installer artifacts one after another, then drop setup-only
/// packages if configured. Every failure is collected; none aborts.
async fn clean<R: CommandRunner>(config: &KilnConfig, runner: &R, target: &Utf8Path) -> Vec<Error> {
    let cleanup = &config.cleanup;
    let mut failures = Vec::new();

    for artifact in &cleanup.artifacts {
        let path = target.join(artifact);
        if let Err(e) = remove_path(&path).await {
            failures.push(Error::cleanup_failure(path.as_str(), e));
        }
    }

    if !cleanup.remove_packages.is_empty() {
        let remove = config
            .package_manager
            .remove_command(&cleanup.remove_packages);
        if let Err(e) = runner.run(&remove, Some(target.as_std_path())).await {
            failures.push(Error::cleanup_failure(cleanup.remove_packages.join(", "), e));
        }
    }

    failures
}

/// Remove a file or directory tree. A path that is already gone is fine.
async fn remove_path(path: &Utf8Path) -> std::io::Result<()> {
    let metadata = match tokio::fs::symlink_metadata(path).await {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(e),
    };

    if metadata.is_dir() {
        tokio::fs::remove_dir_all(path).await
    } else {
        tokio::fs::remove_file(path).await
    }
}

async fn path_exists(path: &Utf8Path) -> bool {
    tokio::fs::symlink_metadata(path).await.is_ok()
}

/// Project names end up in paths, shell commands and `.env` values unescaped
pub fn validate_project_name(name: &str) -> Result<()> {
    if PROJECT_NAME_RE.is_match(name) {
        Ok(())
    } else {
        Err(Error::invalid_project_name(name))
    }
}
