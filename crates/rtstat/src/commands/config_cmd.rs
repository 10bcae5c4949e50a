//! Config subcommand handlers.

use dialoguer::{Confirm, Input, Select};
use secrecy::SecretString;

use rtstat_core::{Credentials, DEFAULT_PORT, Registry};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts, OutputFormat};
use crate::config::{self, Config, Profile};
use crate::error::CliError;
use crate::output;

// ── Helpers ─────────────────────────────────────────────────────────

/// Copy of the config with plaintext passwords masked.
fn redacted(cfg: &Config) -> Config {
    let mut cfg = cfg.clone();
    for profile in cfg.profiles.values_mut() {
        if profile.password.is_some() {
            profile.password = Some("****".into());
        }
    }
    cfg
}

fn render_config(format: OutputFormat, cfg: &Config) -> Result<String, CliError> {
    let cfg = redacted(cfg);
    Ok(match format {
        OutputFormat::Table => toml::to_string_pretty(&cfg)?,
        OutputFormat::Json => serde_json::to_string_pretty(&cfg)?,
        OutputFormat::JsonCompact => serde_json::to_string(&cfg)?,
        OutputFormat::Yaml => serde_yaml::to_string(&cfg)?,
        OutputFormat::Plain => cfg.profiles.keys().cloned().collect::<Vec<_>>().join("\n"),
    })
}

fn available_profiles(cfg: &Config) -> String {
    if cfg.profiles.is_empty() {
        "(none)".into()
    } else {
        cfg.profiles.keys().cloned().collect::<Vec<_>>().join(", ")
    }
}

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

/// Offer to store the password in the system keyring or return it for
/// plaintext config.
///
/// Returns `Some(password)` if the user chose plaintext, `None` if stored
/// in the keyring.
fn prompt_password_storage(profile_name: &str, password: String) -> Result<Option<String>, CliError> {
    let choices = &[
        "Store in system keyring (recommended)",
        "Save to config file (plaintext)",
    ];
    let selection = Select::new()
        .with_prompt("Where to store the password?")
        .items(choices)
        .default(0)
        .interact()
        .map_err(prompt_err)?;

    if selection == 0 {
        config::store_password(profile_name, &SecretString::from(password))?;
        eprintln!("   ✓ Password stored in system keyring");
        Ok(None)
    } else {
        Ok(Some(password))
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Init => init(),

        ConfigCommand::Show => {
            let cfg = config::load_config()?;
            let format = global.output.unwrap_or(OutputFormat::Table);
            output::print_output(&render_config(format, &cfg)?, global.quiet);
            Ok(())
        }

        ConfigCommand::Path => {
            output::print_output(&config::config_path().display().to_string(), global.quiet);
            Ok(())
        }

        ConfigCommand::SetPassword => {
            let cfg = config::load_config_or_default();
            let profile_name = config::active_profile_name(global, &cfg);
            if !cfg.profiles.contains_key(&profile_name) {
                return Err(CliError::ProfileNotFound {
                    available: available_profiles(&cfg),
                    name: profile_name,
                });
            }

            let password = rpassword::prompt_password(format!("Password for '{profile_name}': "))
                .map_err(prompt_err)?;
            if password.is_empty() {
                return Err(CliError::Validation {
                    field: "password".into(),
                    reason: "password cannot be empty".into(),
                });
            }

            config::store_password(&profile_name, &SecretString::from(password))?;
            if !global.quiet {
                eprintln!("✓ Password for profile '{profile_name}' stored in system keyring");
            }
            Ok(())
        }
    }
}

// ── Init: interactive wizard ────────────────────────────────────────

fn init() -> Result<(), CliError> {
    let config_path = config::config_path();
    eprintln!("rtstat configuration wizard");
    eprintln!("   Config path: {}\n", config_path.display());

    let mut cfg = config::load_config_or_default();

    // 1. Profile name
    let profile_name: String = Input::new()
        .with_prompt("Profile name")
        .default("default".into())
        .interact_text()
        .map_err(prompt_err)?;

    if cfg.profiles.contains_key(&profile_name)
        && !Confirm::new()
            .with_prompt(format!("Profile '{profile_name}' exists. Overwrite?"))
            .default(false)
            .interact()
            .map_err(prompt_err)?
    {
        eprintln!("Aborted, nothing written.");
        return Ok(());
    }

    // 2. Router model
    let registry = Registry::builtin();
    let models: Vec<&str> = registry.keys().collect();
    let labels = models
        .iter()
        .map(|key| {
            let driver = registry.create(key, &Credentials::default())?;
            Ok(format!("{key} ({})", driver.name()))
        })
        .collect::<Result<Vec<_>, CliError>>()?;
    let model = Select::new()
        .with_prompt("Router model")
        .items(&labels)
        .default(0)
        .interact()
        .map_err(prompt_err)?;

    // 3. Address
    let host: String = Input::new()
        .with_prompt("Router address")
        .default("192.168.1.254".into())
        .interact_text()
        .map_err(prompt_err)?;
    let port: u16 = Input::new()
        .with_prompt("Telnet port")
        .default(DEFAULT_PORT)
        .interact_text()
        .map_err(prompt_err)?;

    // 4. Credentials, empty means the model default
    let username: String = Input::new()
        .with_prompt("Username (empty for model default)")
        .allow_empty(true)
        .interact_text()
        .map_err(prompt_err)?;
    let password = rpassword::prompt_password("Password (empty for model default): ")
        .map_err(prompt_err)?;
    let password = if password.is_empty() {
        None
    } else {
        prompt_password_storage(&profile_name, password)?
    };

    let mut profile = Profile::new(models[model], host);
    profile.port = (port != DEFAULT_PORT).then_some(port);
    profile.username = (!username.is_empty()).then_some(username);
    profile.password = password;
    profile.validate()?;

    cfg.profiles.insert(profile_name.clone(), profile);
    let default_missing = cfg
        .default_profile
        .as_ref()
        .is_none_or(|name| !cfg.profiles.contains_key(name));
    if default_missing {
        cfg.default_profile = Some(profile_name.clone());
    }

    let written = config::save_config(&cfg)?;
    eprintln!("\n✓ Configuration written to {}", written.display());
    eprintln!("  Profile: {profile_name}");
    eprintln!("\n  Test it: rtstat --profile {profile_name} capture");
    Ok(())
}
