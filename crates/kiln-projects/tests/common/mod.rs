//! Shared test utilities for kiln-projects integration tests
//!
//! The mock runner and the recording surface write into one event log, so a
//! test can check how indicator output and external commands interleave.

#![allow(dead_code)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use camino::{Utf8Path, Utf8PathBuf};
use kiln_core::{CommandOutput, CommandRunner, CommandSpec, Error, KilnConfig, Result};
use kiln_doctor::{ToolCategory, ToolDefinition};
use kiln_projects::{BootstrapPipeline, IndicatorStyle, ProgressIndicator, Surface};

/// Default install command line: toolchain activation, then the package manager
pub const INSTALL: &str = "bash -lc \"nvm use && yarn\"";

/// Something observable that happened during a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    HideCursor,
    ShowCursor,
    Draw(String),
    Clear,
    Run { command: String, cwd: Option<PathBuf> },
}

#[derive(Clone, Default)]
pub struct EventLog(Arc<Mutex<Vec<Event>>>);

impl EventLog {
    pub fn push(&self, event: Event) {
        self.0.lock().unwrap().push(event);
    }

    pub fn events(&self) -> Vec<Event> {
        self.0.lock().unwrap().clone()
    }

    pub fn commands(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Run { command, .. } => Some(command),
                _ => None,
            })
            .collect()
    }

    pub fn cursor_visible(&self) -> bool {
        self.events()
            .iter()
            .rev()
            .find_map(|e| match e {
                Event::HideCursor => Some(false),
                Event::ShowCursor => Some(true),
                _ => None,
            })
            .unwrap_or(true)
    }
}

/// Surface that records into the shared log
pub struct RecordingSurface {
    log: EventLog,
}

impl RecordingSurface {
    pub fn new(log: EventLog) -> Self {
        Self { log }
    }
}

impl Surface for RecordingSurface {
    fn hide_cursor(&self) {
        self.log.push(Event::HideCursor);
    }

    fn show_cursor(&self) {
        self.log.push(Event::ShowCursor);
    }

    fn draw(&self, line: &str) {
        self.log.push(Event::Draw(line.to_string()));
    }

    fn clear(&self) {
        self.log.push(Event::Clear);
    }
}

/// How the mock answers a command
#[derive(Debug, Clone)]
pub enum Behavior {
    Succeed,
    Fail(&'static str),
    /// Never resolves
    Hang,
    /// Succeed after a delay
    Slow(Duration),
    /// Populate the clone target like the backend template would
    Clone,
    /// Like `Clone`, but leave a directory where `.env` should go
    CloneWithEnvDirectory,
    /// Install step: fails unless the installer artifacts are already gone
    /// from the working directory
    InstallIntoCleanedTree,
}

/// Command runner answering from a table keyed by the full command line or
/// by `"program arg0"`
pub struct MockRunner {
    log: EventLog,
    behaviors: HashMap<String, Behavior>,
}

impl MockRunner {
    pub fn new(log: EventLog) -> Self {
        let mut behaviors = HashMap::new();
        behaviors.insert("git clone".to_string(), Behavior::Clone);
        behaviors.insert(INSTALL.to_string(), Behavior::InstallIntoCleanedTree);
        Self { log, behaviors }
    }

    pub fn on(mut self, key: &str, behavior: Behavior) -> Self {
        self.behaviors.insert(key.to_string(), behavior);
        self
    }

    fn behavior_for(&self, command: &CommandSpec) -> Behavior {
        if let Some(b) = self.behaviors.get(&command.to_string()) {
            return b.clone();
        }
        command
            .args
            .first()
            .and_then(|first| self.behaviors.get(&format!("{} {}", command.program, first)))
            .cloned()
            .unwrap_or(Behavior::Succeed)
    }
}

#[async_trait]
impl CommandRunner for MockRunner {
    async fn run(&self, command: &CommandSpec, working_dir: Option<&Path>) -> Result<CommandOutput> {
        self.log.push(Event::Run {
            command: command.to_string(),
            cwd: working_dir.map(Path::to_path_buf),
        });

        match self.behavior_for(command) {
            Behavior::Succeed => Ok(CommandOutput::default()),
            Behavior::Fail(cause) => Err(Error::command(command.to_string(), cause)),
            Behavior::Hang => std::future::pending::<Result<CommandOutput>>().await,
            Behavior::Slow(delay) => {
                tokio::time::sleep(delay).await;
                Ok(CommandOutput::default())
            }
            Behavior::Clone => {
                populate_template(clone_target(command));
                Ok(CommandOutput::default())
            }
            Behavior::CloneWithEnvDirectory => {
                let target = clone_target(command);
                populate_template(target.clone());
                std::fs::create_dir(target.join(".env")).unwrap();
                Ok(CommandOutput::default())
            }
            Behavior::InstallIntoCleanedTree => {
                let cwd = working_dir.expect("install runs inside the project");
                let leftovers: Vec<&str> = [".git", "index.js"]
                    .into_iter()
                    .filter(|artifact| cwd.join(artifact).exists())
                    .collect();
                if leftovers.is_empty() {
                    Ok(CommandOutput::default())
                } else {
                    Err(Error::command(
                        command.to_string(),
                        format!("setup files still present: {}", leftovers.join(", ")),
                    ))
                }
            }
        }
    }
}

/// The clone destination is the only argument naming an existing directory
fn clone_target(command: &CommandSpec) -> PathBuf {
    command
        .args
        .iter()
        .map(PathBuf::from)
        .find(|p| p.is_dir())
        .expect("clone command names an existing target directory")
}

fn populate_template(target: PathBuf) {
    std::fs::create_dir_all(target.join(".git/objects")).unwrap();
    std::fs::write(target.join(".git/HEAD"), "ref: refs/heads/main\n").unwrap();
    std::fs::write(target.join("index.js"), "#!/usr/bin/env node\n").unwrap();
    std::fs::write(target.join("package.json"), "{\"name\":\"backend-template\"}\n").unwrap();
    std::fs::create_dir_all(target.join("src/utils")).unwrap();
    std::fs::write(target.join("src/utils/config.ts"), "export {};\n").unwrap();
}

/// Probe-only tool definitions that bypass the PATH lookup
pub fn fake_tools() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition {
            id: "yarn".to_string(),
            name: "yarn".to_string(),
            probe: CommandSpec::new("yarn").arg("--version"),
            on_path: false,
            category: ToolCategory::PackageManager,
            hint: None,
        },
        ToolDefinition {
            id: "nvm".to_string(),
            name: "nvm".to_string(),
            probe: CommandSpec::shell("nvm --version"),
            on_path: false,
            category: ToolCategory::Toolchain,
            hint: Some("nvm install 18.17.1".to_string()),
        },
    ]
}

pub fn fast_style() -> IndicatorStyle {
    IndicatorStyle::new(
        vec!["1".to_string(), "2".to_string(), "3".to_string()],
        Duration::from_millis(5),
    )
    .unwrap()
}

/// Pipeline over the mock runner with a recording indicator
pub fn pipeline(
    config: KilnConfig,
    runner: MockRunner,
    log: &EventLog,
) -> BootstrapPipeline<MockRunner, RecordingSurface> {
    let indicator = ProgressIndicator::new(fast_style(), RecordingSurface::new(log.clone()));
    BootstrapPipeline::new(config, runner, indicator).with_tools(fake_tools())
}

/// Temporary working directory as a UTF-8 path
pub struct Workspace {
    _dir: tempfile::TempDir,
    pub root: Utf8PathBuf,
}

impl Workspace {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let root = Utf8Path::from_path(dir.path()).unwrap().to_path_buf();
        Self { _dir: dir, root }
    }
}
