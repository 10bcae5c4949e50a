//! Configuration for the rtstat CLI.
//!
//! TOML profiles naming a router model and its address, plus password
//! resolution over env, keyring and plaintext. Command-line flags are
//! layered on top by the binary.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use rtstat_core::DEFAULT_PORT;

/// Keyring service name for stored router passwords.
pub const KEYRING_SERVICE: &str = "rtstat";

/// Environment variable consulted for the router password.
pub const PASSWORD_ENV: &str = "RTSTAT_PASSWORD";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("unknown profile '{name}' (available: {available})")]
    UnknownProfile { name: String, available: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// Profile used when `--profile` is not given.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named router profiles.
    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Pick the profile to use.
    ///
    /// An explicit name must exist. Without one, the `default_profile` is
    /// used if it is defined; otherwise there is no profile.
    pub fn select_profile(&self, name: Option<&str>) -> Result<Option<(&str, &Profile)>, ConfigError> {
        let Some(name) = name else {
            return Ok(self
                .default_profile
                .as_deref()
                .and_then(|n| self.profiles.get_key_value(n))
                .map(|(k, p)| (k.as_str(), p)));
        };

        self.profiles
            .get_key_value(name)
            .map(|(k, p)| Some((k.as_str(), p)))
            .ok_or_else(|| ConfigError::UnknownProfile {
                name: name.into(),
                available: if self.profiles.is_empty() {
                    "none".into()
                } else {
                    self.profiles.keys().cloned().collect::<Vec<_>>().join(", ")
                },
            })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    /// Read and connect timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            timeout_ms: default_timeout_ms(),
            port: default_port(),
        }
    }
}

fn default_output() -> String {
    "json".into()
}
fn default_timeout_ms() -> u64 {
    5000
}
fn default_port() -> u16 {
    DEFAULT_PORT
}

/// A named router profile.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Profile {
    /// Router model key (e.g., "TG585v8").
    pub router: String,

    /// Hostname or IP address of the router console.
    pub host: String,

    /// Override the default telnet port.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,

    /// Console username; the driver default applies when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    /// Console password (plaintext, prefer keyring).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// Environment variable name containing the password.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_env: Option<String>,

    /// Override the default timeout.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
}

impl Profile {
    pub fn new(router: impl Into<String>, host: impl Into<String>) -> Self {
        Self {
            router: router.into(),
            host: host.into(),
            port: None,
            username: None,
            password: None,
            password_env: None,
            timeout_ms: None,
        }
    }

    /// Reject values that can never produce a working capture.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |field: &str, reason: &str| ConfigError::Validation {
            field: field.into(),
            reason: reason.into(),
        };
        if self.router.trim().is_empty() {
            return Err(invalid("router", "model key is empty"));
        }
        if self.host.trim().is_empty() {
            return Err(invalid("host", "host is empty"));
        }
        if self.port == Some(0) {
            return Err(invalid("port", "port 0 is not connectable"));
        }
        if self.timeout_ms == Some(0) {
            return Err(invalid("timeout_ms", "timeout must be positive"));
        }
        Ok(())
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("net", "rtstat", "rtstat").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("rtstat");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from `path` + environment. A missing file yields the defaults.
///
/// Environment variables use `__` as the nesting separator, e.g.
/// `RTSTAT_DEFAULTS__TIMEOUT_MS=2000`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("RTSTAT_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if it cannot be read.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(cfg, &path)?;
    Ok(path)
}

/// Serialize config to TOML and write it to `path`, creating parents.
pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Password resolution ─────────────────────────────────────────────

fn keyring_account(profile_name: &str) -> String {
    format!("{profile_name}/password")
}

/// Resolve the router password for a profile (no CLI flag step).
///
/// Order: the profile's `password_env` variable, `RTSTAT_PASSWORD`, the
/// system keyring, then the plaintext profile value. `None` lets the
/// driver fall back to its model default.
pub fn resolve_password(profile: &Profile, profile_name: &str) -> Option<SecretString> {
    resolve_password_with(
        profile,
        profile_name,
        |var| std::env::var(var).ok(),
        |account| {
            keyring::Entry::new(KEYRING_SERVICE, account)
                .and_then(|entry| entry.get_password())
                .ok()
        },
    )
}

fn resolve_password_with(
    profile: &Profile,
    profile_name: &str,
    env: impl Fn(&str) -> Option<String>,
    keyring: impl Fn(&str) -> Option<String>,
) -> Option<SecretString> {
    profile
        .password_env
        .as_deref()
        .and_then(&env)
        .or_else(|| env(PASSWORD_ENV))
        .or_else(|| keyring(&keyring_account(profile_name)))
        .or_else(|| profile.password.clone())
        .map(SecretString::from)
}

/// Store a profile's password in the system keyring.
pub fn store_password(profile_name: &str, password: &SecretString) -> Result<(), ConfigError> {
    let entry = keyring::Entry::new(KEYRING_SERVICE, &keyring_account(profile_name))?;
    entry.set_password(password.expose_secret())?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn resolved(profile: &Profile, env: &[(&str, &str)], keyring: &[(&str, &str)]) -> Option<String> {
        resolve_password_with(profile, "home", lookup(env), lookup(keyring))
            .map(|s| s.expose_secret().to_owned())
    }

    #[test]
    fn profile_env_var_wins() {
        let mut profile = Profile::new("TG585v8", "192.168.1.254");
        profile.password_env = Some("HOME_ROUTER_PW".into());
        profile.password = Some("plain".into());
        let pw = resolved(
            &profile,
            &[("HOME_ROUTER_PW", "from-profile-env"), (PASSWORD_ENV, "from-global-env")],
            &[("home/password", "from-keyring")],
        );
        assert_eq!(pw.as_deref(), Some("from-profile-env"));
    }

    #[test]
    fn unset_profile_env_var_falls_through() {
        let mut profile = Profile::new("TG585v8", "192.168.1.254");
        profile.password_env = Some("HOME_ROUTER_PW".into());
        let pw = resolved(&profile, &[(PASSWORD_ENV, "from-global-env")], &[]);
        assert_eq!(pw.as_deref(), Some("from-global-env"));
    }

    #[test]
    fn keyring_before_plaintext() {
        let mut profile = Profile::new("TG585v8", "192.168.1.254");
        profile.password = Some("plain".into());
        assert_eq!(
            resolved(&profile, &[], &[("home/password", "from-keyring")]).as_deref(),
            Some("from-keyring")
        );
        assert_eq!(resolved(&profile, &[], &[]).as_deref(), Some("plain"));
    }

    #[test]
    fn no_password_anywhere() {
        let profile = Profile::new("TG585v8", "192.168.1.254");
        assert_eq!(resolved(&profile, &[], &[("work/password", "other")]), None);
    }

    #[test]
    fn validate_rejects_empty_host_and_zero_port() {
        assert!(Profile::new("TG585v8", "10.0.0.138").validate().is_ok());
        assert!(matches!(
            Profile::new("TG585v8", " ").validate(),
            Err(ConfigError::Validation { ref field, .. }) if field == "host"
        ));
        let mut profile = Profile::new("TG585v8", "10.0.0.138");
        profile.port = Some(0);
        assert!(profile.validate().is_err());
    }

    #[test]
    fn select_profile_falls_back_to_default() {
        let mut config = Config::default();
        assert_eq!(config.select_profile(None).unwrap(), None);

        config
            .profiles
            .insert("default".into(), Profile::new("TG585v8", "192.168.1.254"));
        let (name, profile) = config.select_profile(None).unwrap().unwrap();
        assert_eq!(name, "default");
        assert_eq!(profile.host, "192.168.1.254");
    }

    #[test]
    fn select_unknown_profile_fails() {
        let err = Config::default().select_profile(Some("office")).unwrap_err();
        assert_eq!(err.to_string(), "unknown profile 'office' (available: none)");
    }
}
