//! Error types for kiln-core

use thiserror::Error;

/// Result type alias using kiln-core's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Error taxonomy shared by the bootstrap pipeline and its collaborators
#[derive(Error, Debug)]
pub enum Error {
    /// No project name was given on the command line
    #[error("You have to provide a name to your app")]
    MissingArgument,

    /// Project name is not a filesystem and shell safe identifier
    #[error("Invalid project name: {name}. Use letters, digits, '.', '_' and '-', starting with a letter or digit")]
    InvalidProjectName { name: String },

    /// A required external tool is not installed or not working
    #[error("{tool} is not installed, please install it and try again{}", hint_suffix(.hint))]
    MissingDependency { tool: String, hint: Option<String> },

    /// Target directory already exists
    #[error("The file {path} already exists in the current directory, please give it another name")]
    TargetExists { path: String },

    /// External command exited non-zero or could not be spawned
    #[error("Command `{command}` failed: {cause}")]
    Command { command: String, cause: String },

    /// Installer artifact could not be removed (non-fatal)
    #[error("Failed to remove {path}: {cause}")]
    CleanupFailure { path: String, cause: String },

    /// Environment file could not be written
    #[error("Failed to write {path}: {cause}")]
    WriteFailure { path: String, cause: String },

    /// Run cancelled by the user
    #[error("Interrupted")]
    Interrupted,

    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    /// Invalid configuration value
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    YamlParse(#[from] serde_yaml_ng::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn hint_suffix(hint: &Option<String>) -> String {
    match hint {
        Some(hint) => format!(". Command: {}", hint),
        None => String::new(),
    }
}

impl Error {
    /// Create an invalid project name error
    pub fn invalid_project_name(name: impl Into<String>) -> Self {
        Self::InvalidProjectName { name: name.into() }
    }

    /// Create a missing dependency error
    pub fn missing_dependency(tool: impl Into<String>, hint: Option<&str>) -> Self {
        Self::MissingDependency {
            tool: tool.into(),
            hint: hint.map(str::to_string),
        }
    }

    /// Create a target exists error
    pub fn target_exists(path: impl Into<String>) -> Self {
        Self::TargetExists { path: path.into() }
    }

    /// Create a command failure error
    pub fn command(command: impl Into<String>, cause: impl Into<String>) -> Self {
        Self::Command {
            command: command.into(),
            cause: cause.into(),
        }
    }

    /// Create a cleanup failure error
    pub fn cleanup_failure(path: impl Into<String>, cause: impl ToString) -> Self {
        Self::CleanupFailure {
            path: path.into(),
            cause: cause.to_string(),
        }
    }

    /// Create a write failure error
    pub fn write_failure(path: impl Into<String>, cause: impl ToString) -> Self {
        Self::WriteFailure {
            path: path.into(),
            cause: cause.to_string(),
        }
    }

    /// Create a config not found error
    pub fn config_not_found(path: impl Into<String>) -> Self {
        Self::ConfigNotFound { path: path.into() }
    }

    /// Create an invalid config error
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }
}
