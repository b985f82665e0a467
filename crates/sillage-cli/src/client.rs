//! Client wiring, error types, and interactive prompts shared by the commands.

use std::fmt::{self, Display, Formatter};
use std::io::{self, BufRead, Write};

use anyhow::anyhow;
use sillage_config::{ClientConfig, ConfigError, ConfigOverrides};
use sillage_core::{AuthFailure, ClientError, ErrorKind, Sillage};
use sillage_telemetry::{LogFormat, LoggingConfig, build_sha, init_logging};
use tracing::{debug, warn};

use crate::cli::{Cli, OutputFormat};

const BUILD_SHA: &str = match option_env!("SILLAGE_BUILD_SHA") {
    Some(sha) => sha,
    None => "dev",
};

/// CLI-level error type separating usage problems, sign-in problems, and
/// operational failures.
#[derive(Debug)]
pub(crate) enum CliError {
    Validation(String),
    Auth(String),
    Failure(anyhow::Error),
}

/// Convenience alias for functions returning a `CliError`.
pub(crate) type CliResult<T> = Result<T, CliError>;

impl CliError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub(crate) fn auth(message: impl Into<String>) -> Self {
        Self::Auth(message.into())
    }

    pub(crate) fn failure(error: impl Into<anyhow::Error>) -> Self {
        Self::Failure(error.into())
    }

    pub(crate) const fn exit_code(&self) -> i32 {
        match self {
            Self::Validation(_) => 2,
            Self::Failure(_) => 3,
            Self::Auth(_) => 4,
        }
    }

    pub(crate) fn display_message(&self) -> String {
        match self {
            Self::Validation(message) | Self::Auth(message) => message.clone(),
            Self::Failure(error) => format!("{error:#}"),
        }
    }

    fn from_kind(kind: ErrorKind, message: String) -> Self {
        match kind {
            ErrorKind::Validation => Self::Validation(message),
            ErrorKind::Auth => Self::Auth(message),
            ErrorKind::Conflict | ErrorKind::Network | ErrorKind::Server | ErrorKind::Storage => {
                Self::Failure(anyhow!(message))
            }
        }
    }
}

impl Display for CliError {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str("cli error")
    }
}

impl std::error::Error for CliError {}

impl From<ClientError> for CliError {
    fn from(err: ClientError) -> Self {
        Self::from_kind(err.kind(), err.user_message())
    }
}

impl From<AuthFailure> for CliError {
    fn from(failure: AuthFailure) -> Self {
        Self::from_kind(failure.kind, failure.message)
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        Self::Validation(err.detail())
    }
}

/// Resolve configuration from the environment, then apply command-line flags.
pub(crate) fn load_config(cli: &Cli) -> CliResult<ClientConfig> {
    let config = ClientConfig::from_env()?.with_overrides(ConfigOverrides {
        api_url: cli.api_url.clone(),
        http_timeout_secs: cli.timeout,
        state_dir: cli.state_dir.clone(),
    })?;
    Ok(config)
}

/// Install the log subscriber; a failure only costs diagnostics.
pub(crate) fn init_telemetry(config: &ClientConfig) {
    let format = LogFormat::from_setting(config.log_format.as_deref())
        .unwrap_or_else(|_| LogFormat::infer());
    let logging = LoggingConfig {
        level: &config.log_level,
        format,
        build_sha: BUILD_SHA,
    };
    if let Err(err) = init_logging(&logging) {
        eprintln!("warning: logging disabled: {err}");
    }
}

/// Application context passed to command handlers.
pub(crate) struct AppContext {
    pub(crate) client: Sillage,
    pub(crate) output: OutputFormat,
    pub(crate) search_limit: u32,
}

impl AppContext {
    /// Wire the client and restore any session persisted on this device.
    pub(crate) async fn connect(config: &ClientConfig, output: OutputFormat) -> CliResult<Self> {
        let client = Sillage::from_config(config)?;
        match client.start().await {
            Ok(status) => debug!(?status, build = build_sha(), "client ready"),
            Err(err) => warn!(
                error = %err,
                path = %config.session_path().display(),
                "stored session unreadable; continuing signed out"
            ),
        }
        Ok(Self {
            client,
            output,
            search_limit: config.search_limit,
        })
    }

    /// Fail early when no one is signed in.
    pub(crate) fn require_session(&self) -> CliResult<()> {
        if self.client.session().is_authenticated() {
            Ok(())
        } else {
            Err(CliError::auth("not signed in; run `sillage login` first"))
        }
    }
}

pub(crate) fn prompt_password(label: &str) -> CliResult<String> {
    let password = rpassword::prompt_password(label).map_err(|err| {
        CliError::failure(anyhow!("failed to read password from stdin: {err}"))
    })?;
    if password.is_empty() {
        return Err(CliError::validation("password cannot be empty"));
    }
    Ok(password)
}

pub(crate) fn prompt_line(label: &str) -> CliResult<String> {
    let mut stdout = io::stdout();
    write!(stdout, "{label}")
        .and_then(|()| stdout.flush())
        .map_err(|err| CliError::failure(anyhow!("failed to write prompt: {err}")))?;
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .map_err(|err| CliError::failure(anyhow!("failed to read from stdin: {err}")))?;
    Ok(line.trim().to_string())
}

pub(crate) fn confirm(question: &str) -> CliResult<bool> {
    let answer = prompt_line(&format!("{question} [y/N] "))?;
    Ok(is_affirmative(&answer))
}

pub(crate) fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
