//! Tool definition types

use kiln_core::CommandSpec;

/// An external tool the scaffolder depends on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolDefinition {
    /// Unique identifier (e.g., "git", "yarn")
    pub id: String,

    /// Name shown to the user when the tool is missing
    pub name: String,

    /// Trivial command that succeeds only when the tool works
    pub probe: CommandSpec,

    /// Whether the probe's program can be looked up in PATH. Shell functions
    /// such as nvm are only visible from inside a shell.
    pub on_path: bool,

    pub category: ToolCategory,

    /// Install hint shown when the probe fails
    pub hint: Option<String>,
}

impl ToolDefinition {
    /// A tool that is a regular executable answering `<command> --version`
    pub fn executable(
        id: impl Into<String>,
        command: impl Into<String>,
        category: ToolCategory,
    ) -> Self {
        let id = id.into();
        let command = command.into();
        Self {
            name: id.clone(),
            id,
            probe: CommandSpec::new(command).arg("--version"),
            on_path: true,
            category,
            hint: None,
        }
    }
}

/// Why a tool is needed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolCategory {
    /// Version-control client used for cloning
    VersionControl,
    /// Package manager used for installing dependencies
    PackageManager,
    /// Toolchain version manager
    Toolchain,
}
