//! `kiln <project-name>` command handler

use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use kiln_core::{Error, KilnConfig, TokioCommandRunner};
use kiln_projects::{
    BootstrapPipeline, BootstrapReport, BootstrapRequest, IndicatorStyle, PipelineOutcome,
    ProgressIndicator, TermSurface,
};
use tracing::{debug, info};

use crate::cli::Cli;
use crate::output;

/// Create the project and return the process exit code
pub(crate) async fn run(cli: Cli) -> Result<u8> {
    let cwd = std::env::current_dir().context("Failed to read the current directory")?;
    let cwd = Utf8PathBuf::try_from(cwd).context("Current directory path is not valid UTF-8")?;

    let request = match BootstrapRequest::from_args(cli.project_name.clone(), &cwd) {
        Ok(request) => request,
        Err(Error::MissingArgument) => {
            output::usage();
            return Ok(1);
        }
        Err(e) => return Err(e.into()),
    };

    let config = load_config(&cli, &cwd)?;
    let style =
        IndicatorStyle::from_config(&config.indicator).context("Invalid indicator settings")?;

    // Verbose logs and quiet runs both keep the indicator off the terminal.
    let surface = if cli.verbose > 0 || cli.quiet {
        TermSurface::disabled()
    } else {
        TermSurface::stdout()
    };
    let indicator = ProgressIndicator::new(style, surface);
    let mut pipeline = BootstrapPipeline::new(config, TokioCommandRunner::new(), indicator);

    if !cli.quiet {
        output::info(&format!("Creating {}", request.target_directory()));
    }

    let outcome = pipeline.run_until(&request, interrupted()).await;
    let code = outcome.exit_code();

    match outcome {
        PipelineOutcome::Success(report) => {
            if !cli.quiet {
                print_summary(&report);
            }
        }
        PipelineOutcome::Failure { reason, stage } => {
            output::error(&format!("Failed while {}: {}", stage, reason));
        }
    }

    Ok(u8::try_from(code).unwrap_or(1))
}

/// Config file first, then command-line overrides
fn load_config(cli: &Cli, cwd: &Utf8Path) -> Result<KilnConfig> {
    let mut config =
        KilnConfig::load(cli.config.as_deref(), cwd).context("Failed to load configuration")?;

    if let Some(template) = &cli.template {
        config.template.repository = template.clone();
    }
    if cli.skip_toolchain_check {
        config.toolchain.check = false;
    }

    config.validate()?;
    debug!(
        "Template {} (depth {}), install with `{}`",
        config.template.repository,
        config.template.depth,
        config.install_command()
    );
    Ok(config)
}

/// Resolves on Ctrl-C. Never resolves if the handler cannot be installed.
async fn interrupted() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Interrupted, rolling back"),
        Err(e) => {
            debug!("Ctrl-C handler unavailable: {}", e);
            std::future::pending::<()>().await;
        }
    }
}

fn print_summary(report: &BootstrapReport) {
    for failure in &report.cleanup_failures {
        output::warning(&failure.to_string());
    }

    output::success("The installation is done!");
    output::kv("Location", report.project_dir.as_str());

    output::header("Next steps");
    println!(
        "Before running your server, fill in the following keys in {}/.env,",
        report.project_name
    );
    println!("or remove them from src/utils/config.ts:");
    output::placeholders(&report.placeholders);
    println!();
    println!("   cd {}", report.project_name);
}
