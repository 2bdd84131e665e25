//! CLI argument parsing with clap

use camino::Utf8PathBuf;
use clap::Parser;

/// Kiln - scaffold a new backend project from the template repository
#[derive(Parser, Debug)]
#[command(name = "kiln")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Name of the project directory to create in the current directory
    pub project_name: Option<String>,

    /// Path to kiln.yaml config file
    #[arg(short, long, env = "KILN_CONFIG")]
    pub config: Option<Utf8PathBuf>,

    /// Template repository to clone instead of the configured one
    #[arg(long, env = "KILN_TEMPLATE")]
    pub template: Option<String>,

    /// Do not probe for the toolchain version manager or activate it before installing
    #[arg(long)]
    pub skip_toolchain_check: bool,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress output
    #[arg(short, long)]
    pub quiet: bool,
}
