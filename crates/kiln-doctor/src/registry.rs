//! Required tool registry
//!
//! git is fixed; the package manager and toolchain probe follow the
//! configuration so that a custom setup is checked for what it will actually
//! run.

use kiln_core::{CommandSpec, KilnConfig};

use crate::tool::{ToolCategory, ToolDefinition};

/// Tools the pipeline needs, in the order they are reported
pub fn required_tools(config: &KilnConfig) -> Vec<ToolDefinition> {
    let mut tools = vec![
        ToolDefinition::executable(
            &config.package_manager.command,
            &config.package_manager.command,
            ToolCategory::PackageManager,
        ),
        ToolDefinition::executable("git", "git", ToolCategory::VersionControl),
    ];

    if config.toolchain.check {
        let probe = config.toolchain.probe_command();
        tools.push(ToolDefinition {
            id: "nvm".to_string(),
            name: toolchain_name(&probe),
            on_path: false,
            probe,
            category: ToolCategory::Toolchain,
            hint: config.toolchain.hint.clone(),
        });
    }

    tools
}

/// Best-effort display name for the toolchain probe: the first word of a
/// shell script, or the program itself.
fn toolchain_name(probe: &CommandSpec) -> String {
    if probe.program == "bash" || probe.program == "sh" {
        if let Some(script) = probe.args.last() {
            if let Some(word) = script.split_whitespace().next() {
                return word.to_string();
            }
        }
    }
    probe.program.clone()
}
