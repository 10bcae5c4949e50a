//! CLI configuration: thin wrapper around `rtstat_config` shared types.
//!
//! Adds the flag-aware resolution that turns `capture` arguments, the
//! selected profile, and `[defaults]` into one capture request.

use std::time::Duration;

use clap::ValueEnum;
use secrecy::SecretString;
use tracing::debug;

use rtstat_core::{CaptureOptions, Credentials};

use crate::cli::{CaptureArgs, GlobalOpts, OutputFormat};
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use rtstat_config::{
    Config, Profile, config_path, load_config, load_config_or_default, save_config,
    store_password,
};

// ── CLI-specific helpers ────────────────────────────────────────────

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Output format: `--output` flag, else `defaults.output`.
pub fn output_format(global: &GlobalOpts, config: &Config) -> Result<OutputFormat, CliError> {
    if let Some(format) = global.output {
        return Ok(format);
    }
    OutputFormat::from_str(&config.defaults.output, true).map_err(|_| CliError::Validation {
        field: "defaults.output".into(),
        reason: format!(
            "unknown format '{}' (expected json, json-compact, yaml, table, or plain)",
            config.defaults.output
        ),
    })
}

/// Everything needed for one capture.
#[derive(Debug)]
pub struct CaptureRequest {
    pub router: String,
    pub host: String,
    pub port: u16,
    pub credentials: Credentials,
    pub options: CaptureOptions,
}

/// Merge `capture` flags over the selected profile over `[defaults]`.
///
/// Router model and host are required from one source or the other.
/// Credentials left unset fall through to the driver's model defaults.
pub fn resolve_capture(
    args: &CaptureArgs,
    global: &GlobalOpts,
    config: &Config,
) -> Result<CaptureRequest, CliError> {
    let profile = config.select_profile(global.profile.as_deref())?;
    if let Some((name, profile)) = profile {
        debug!(profile = name, "using profile");
        profile.validate()?;
    }
    let profile_field = |f: fn(&Profile) -> Option<String>| profile.and_then(|(_, p)| f(p));

    let router = args
        .router
        .clone()
        .or_else(|| profile_field(|p| Some(p.router.clone())))
        .ok_or_else(|| CliError::MissingArgument {
            name: "router model".into(),
            flag: "--router <MODEL>".into(),
        })?;

    let host = args
        .host
        .clone()
        .or_else(|| profile_field(|p| Some(p.host.clone())))
        .ok_or_else(|| CliError::MissingArgument {
            name: "router host".into(),
            flag: "--host <HOST>".into(),
        })?;

    let port = args
        .port
        .or_else(|| profile.and_then(|(_, p)| p.port))
        .unwrap_or(config.defaults.port);
    if port == 0 {
        return Err(CliError::Validation {
            field: "port".into(),
            reason: "port 0 is not connectable".into(),
        });
    }

    let timeout_ms = args
        .timeout
        .or_else(|| profile.and_then(|(_, p)| p.timeout_ms))
        .unwrap_or(config.defaults.timeout_ms);
    if timeout_ms == 0 {
        return Err(CliError::Validation {
            field: "defaults.timeout_ms".into(),
            reason: "timeout must be positive".into(),
        });
    }

    let username = args
        .username
        .clone()
        .or_else(|| profile_field(|p| p.username.clone()));
    let password = match (&args.password, profile) {
        (Some(pw), _) => Some(SecretString::from(pw.clone())),
        (None, Some((name, p))) => rtstat_config::resolve_password(p, name),
        (None, None) => None,
    };

    Ok(CaptureRequest {
        router,
        host,
        port,
        credentials: Credentials::new(username, password),
        options: CaptureOptions::uniform(Duration::from_millis(timeout_ms)),
    })
}
