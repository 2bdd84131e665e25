//! Configuration file loading and parsing
//!
//! Every field has a default, so a missing `kiln.yaml` yields the stock
//! backend-template setup. Values are passed explicitly to the components
//! that need them; nothing here is process-wide state.

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use std::fs;
use tracing::debug;

use crate::error::{Error, Result};
use crate::process::CommandSpec;

/// Configuration file names searched in the working directory
const CONFIG_FILE_NAMES: &[&str] = &["kiln.yaml", "kiln.yml"];

/// Default template repository
pub const DEFAULT_TEMPLATE_REPOSITORY: &str = "https://github.com/hypercolor/backend-template.git";

/// Root configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KilnConfig {
    pub template: TemplateConfig,
    pub package_manager: PackageManagerConfig,
    pub toolchain: ToolchainConfig,
    pub cleanup: CleanupConfig,
    pub indicator: IndicatorConfig,
}

/// Template repository to clone
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateConfig {
    pub repository: String,
    /// Shallow clone depth
    pub depth: u32,
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            repository: DEFAULT_TEMPLATE_REPOSITORY.to_string(),
            depth: 1,
        }
    }
}

/// Package manager used for installing and pruning dependencies
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PackageManagerConfig {
    pub command: String,
    pub install_args: Vec<String>,
    pub remove_args: Vec<String>,
}

impl Default for PackageManagerConfig {
    fn default() -> Self {
        Self {
            command: "yarn".to_string(),
            install_args: Vec::new(),
            remove_args: vec!["remove".to_string()],
        }
    }
}

impl PackageManagerConfig {
    /// Command that installs the project's dependencies
    pub fn install_command(&self) -> CommandSpec {
        CommandSpec::new(&self.command).args(self.install_args.iter().cloned())
    }

    /// Command that removes `packages` from the project
    pub fn remove_command(&self, packages: &[String]) -> CommandSpec {
        CommandSpec::new(&self.command)
            .args(self.remove_args.iter().cloned())
            .args(packages.iter().cloned())
    }
}

/// Toolchain version manager probe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolchainConfig {
    /// Whether the probe runs at all
    pub check: bool,
    pub command: String,
    pub args: Vec<String>,
    /// Shown to the user when the probe fails
    pub hint: Option<String>,
    /// Shell snippet run before the install, in the same login shell, so the
    /// template's pinned toolchain version is active
    pub activate: Option<String>,
}

impl Default for ToolchainConfig {
    fn default() -> Self {
        Self {
            check: true,
            command: "bash".to_string(),
            args: vec!["-lc".to_string(), "nvm --version".to_string()],
            hint: Some("nvm install 18.17.1".to_string()),
            activate: Some("nvm use".to_string()),
        }
    }
}

impl ToolchainConfig {
    pub fn probe_command(&self) -> CommandSpec {
        CommandSpec::new(&self.command).args(self.args.iter().cloned())
    }

    /// Activation snippet, only when the toolchain is in use at all
    pub fn activation(&self) -> Option<&str> {
        if !self.check {
            return None;
        }
        self.activate
            .as_deref()
            .map(str::trim)
            .filter(|script| !script.is_empty())
    }
}

/// Post-clone cleanup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CleanupConfig {
    /// Paths relative to the project root removed after cloning
    pub artifacts: Vec<String>,
    /// Packages removed with the package manager after cloning
    pub remove_packages: Vec<String>,
}

impl Default for CleanupConfig {
    fn default() -> Self {
        Self {
            artifacts: vec![".git".to_string(), "index.js".to_string()],
            remove_packages: Vec::new(),
        }
    }
}

/// Named built-in indicator styles
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndicatorStyleName {
    #[default]
    Dots,
    Line,
}

/// Progress indicator appearance
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorConfig {
    pub style: IndicatorStyleName,
    /// Replaces the style's frames when set
    pub frames: Option<Vec<String>>,
    /// Replaces the style's interval when set
    pub interval_ms: Option<u64>,
}

impl KilnConfig {
    /// Load configuration from `path`, or from `kiln.yaml` in `search_dir`,
    /// falling back to defaults when neither is present.
    pub fn load(path: Option<&Utf8Path>, search_dir: &Utf8Path) -> Result<Self> {
        let config = match path {
            Some(p) => Self::from_file(p)?,
            None => match Self::find_config(search_dir) {
                Some(found) => Self::from_file(&found)?,
                None => {
                    debug!("No config file found, using defaults");
                    Self::default()
                }
            },
        };

        config.validate()?;
        Ok(config)
    }

    /// Parse a YAML config file
    pub fn from_file(path: &Utf8Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::config_not_found(path.as_str())
            } else {
                Error::Io(e)
            }
        })?;
        debug!("Loaded configuration from {}", path);
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        Ok(serde_yaml_ng::from_str(content)?)
    }

    /// Install command for the new project. With an active toolchain the
    /// install runs in the same login shell right after the activation
    /// snippet, e.g. `bash -lc "nvm use && yarn"`.
    pub fn install_command(&self) -> CommandSpec {
        let install = self.package_manager.install_command();
        match self.toolchain.activation() {
            Some(activate) => CommandSpec::shell(format!("{} && {}", activate, install)),
            None => install,
        }
    }

    fn find_config(dir: &Utf8Path) -> Option<Utf8PathBuf> {
        CONFIG_FILE_NAMES
            .iter()
            .map(|name| dir.join(name))
            .find(|p| p.is_file())
    }

    /// Reject values the pipeline cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.template.repository.trim().is_empty() {
            return Err(Error::invalid_config("template.repository must not be empty"));
        }
        if self.template.depth == 0 {
            return Err(Error::invalid_config("template.depth must be at least 1"));
        }
        if self.package_manager.command.trim().is_empty() {
            return Err(Error::invalid_config(
                "package_manager.command must not be empty",
            ));
        }
        if self.toolchain.check && self.toolchain.command.trim().is_empty() {
            return Err(Error::invalid_config("toolchain.command must not be empty"));
        }
        if let Some(frames) = &self.indicator.frames {
            if frames.is_empty() {
                return Err(Error::invalid_config("indicator.frames must not be empty"));
            }
        }
        if self.indicator.interval_ms == Some(0) {
            return Err(Error::invalid_config("indicator.interval_ms must be positive"));
        }
        Ok(())
    }
}
