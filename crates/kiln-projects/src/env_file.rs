//! Starter `.env` generation

use std::fmt;

use camino::Utf8Path;
use kiln_core::{Error, Result};
use tracing::debug;

/// Name of the generated file, relative to the project root
pub const ENV_FILE_NAME: &str = ".env";

/// One line of the generated file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvLine {
    Comment(&'static str),
    Var { key: &'static str, value: String },
}

impl EnvLine {
    fn var(key: &'static str, value: impl Into<String>) -> Self {
        Self::Var {
            key,
            value: value.into(),
        }
    }
}

impl fmt::Display for EnvLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Comment(text) => write!(f, "# {}", text),
            Self::Var { key, value } => write!(f, "{}={}", key, value),
        }
    }
}

/// The fixed set of lines for `project_name`, in file order.
/// The name is inserted verbatim; callers validate it first.
pub fn entries(project_name: &str) -> Vec<EnvLine> {
    vec![
        EnvLine::Comment("Localhost variables"),
        EnvLine::Comment(
            "You can change these to your liking, but make sure to change them in the util/config.ts file as well",
        ),
        EnvLine::Comment("Do not commit this file to git, it is ignored by default"),
        EnvLine::var("APP_NAME", project_name),
        EnvLine::var(
            "DATABASE_URL",
            format!("postgres://localhost:5432/{}", project_name),
        ),
        EnvLine::var("ENVIRONMENT_NAME", "dev"),
        EnvLine::var("MONGODB_DATABASE_NAME", project_name),
        EnvLine::var("MONGODB_URL", "mongodb://localhost:27017"),
        EnvLine::var("REDIS_URL", "redis://localhost:6379"),
        EnvLine::var("SERVER_DOMAIN", "localhost"),
        EnvLine::var("SQS_URL_ASYNC_WORKER", "stub"),
    ]
}

/// File content: one entry per line, no trailing newline
pub fn render(project_name: &str) -> String {
    entries(project_name)
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Write the `.env` content for `project_name` to `path`
pub async fn write(path: &Utf8Path, project_name: &str) -> Result<()> {
    debug!("Writing environment file: {}", path);
    tokio::fs::write(path, render(project_name))
        .await
        .map_err(|e| Error::write_failure(path.as_str(), e))
}

/// Keys the user still has to point at real services, with the expected shape
pub fn placeholders(project_name: &str) -> Vec<(&'static str, String)> {
    vec![
        (
            "DATABASE_URL",
            "postgres://<username>:<password>@<host>:<port>/<database>".to_string(),
        ),
        ("MONGODB_DATABASE_NAME", project_name.to_string()),
        (
            "MONGODB_URL",
            "mongodb://<username>:<password>@<host>:<port>/<database>".to_string(),
        ),
        (
            "SQS_URL_ASYNC_WORKER",
            "https://sqs.<region>.amazonaws.com/<account_id>/<queue_name>".to_string(),
        ),
        ("REDIS_URL", "redis://<host>:<port>".to_string()),
    ]
}
