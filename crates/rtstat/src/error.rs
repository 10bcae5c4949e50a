//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors with
//! actionable help text and a stable exit code.

use miette::Diagnostic;
use thiserror::Error;

use rtstat_config::ConfigError;
use rtstat_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const PARSE: i32 = 5;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Router selection ─────────────────────────────────────────────

    #[error("Unsupported router model '{key}'")]
    #[diagnostic(
        code(rtstat::unsupported_router),
        help("Supported models: {supported}\nRun: rtstat routers")
    )]
    UnsupportedRouter { key: String, supported: String },

    // ── Connection ───────────────────────────────────────────────────

    #[error("Could not connect to router at {addr}")]
    #[diagnostic(
        code(rtstat::connection_failed),
        help(
            "{reason}\n\
             Check that the router is reachable and its telnet console is enabled."
        )
    )]
    ConnectionFailed { addr: String, reason: String },

    #[error("Router session failed: {message}")]
    #[diagnostic(
        code(rtstat::session_lost),
        help("The router closed the console unexpectedly. Another telnet session may be open.")
    )]
    SessionLost { message: String },

    // ── Authentication ───────────────────────────────────────────────

    #[error("Authentication failed")]
    #[diagnostic(
        code(rtstat::auth_failed),
        help(
            "{message}\n\
             Pass --username / --password, or run: rtstat config set-password"
        )
    )]
    AuthFailed { message: String },

    // ── Timeout ──────────────────────────────────────────────────────

    #[error("Router did not answer within {timeout_ms}ms")]
    #[diagnostic(
        code(rtstat::timeout),
        help(
            "Increase the timeout with --timeout, or check that --router matches the device.\n\
             Last output: {pending:?}"
        )
    )]
    Timeout { timeout_ms: u64, pending: String },

    // ── Router output ────────────────────────────────────────────────

    #[error("Could not parse '{section}' output: {reason}")]
    #[diagnostic(
        code(rtstat::parse),
        help(
            "The router printed something this driver does not understand.\n\
             Output: {snippet:?}"
        )
    )]
    Parse {
        section: String,
        reason: String,
        snippet: String,
    },

    // ── Validation ───────────────────────────────────────────────────

    #[error("Missing {name}")]
    #[diagnostic(
        code(rtstat::missing_argument),
        help("Pass {flag}, or set it in a profile (rtstat config init).")
    )]
    MissingArgument { name: String, flag: String },

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(rtstat::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(rtstat::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: rtstat config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error(transparent)]
    #[diagnostic(code(rtstat::config))]
    Config(Box<ConfigError>),

    // ── IO / Serialization ───────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to encode output: {0}")]
    #[diagnostic(code(rtstat::json))]
    Json(#[from] serde_json::Error),

    #[error("Failed to encode output: {0}")]
    #[diagnostic(code(rtstat::yaml))]
    Yaml(#[from] serde_yaml::Error),

    #[error("Failed to encode config: {0}")]
    #[diagnostic(code(rtstat::toml))]
    Toml(#[from] toml::ser::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::UnsupportedRouter { .. }
            | Self::MissingArgument { .. }
            | Self::Validation { .. }
            | Self::ProfileNotFound { .. } => exit_code::USAGE,
            Self::AuthFailed { .. } => exit_code::AUTH,
            Self::Parse { .. } => exit_code::PARSE,
            Self::ConnectionFailed { .. } | Self::SessionLost { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::UnsupportedRouter { key, supported } => {
                CliError::UnsupportedRouter { key, supported }
            }

            CoreError::Connection { addr, reason } => CliError::ConnectionFailed { addr, reason },

            CoreError::Authentication { message } => CliError::AuthFailed { message },

            CoreError::TransportTimeout {
                timeout_ms,
                pending,
            } => CliError::Timeout {
                timeout_ms,
                pending,
            },

            CoreError::Transport { message } => CliError::SessionLost { message },

            CoreError::Parse {
                section,
                reason,
                snippet,
            } => CliError::Parse {
                section,
                reason,
                snippet,
            },

            CoreError::Serialization(e) => CliError::Json(e),
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::UnknownProfile { name, available } => {
                CliError::ProfileNotFound { name, available }
            }
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            other => CliError::Config(Box::new(other)),
        }
    }
}
