//! Clap derive structures for the `rtstat` CLI.
//!
//! Also compiled by `build.rs` for man page generation, so it may only
//! depend on clap and clap_complete.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// rtstat -- router statistics over telnet
#[derive(Debug, Parser)]
#[command(
    name = "rtstat",
    version,
    about = "Capture line status and traffic counters from a home router",
    long_about = "Logs into a router's telnet console, runs the model's diagnostic \
        commands, and prints one JSON snapshot:\n\n    \
        {\"data\": {...}, \"router\": \"<model name>\", \"timestamp\": <unix seconds>}\n\n\
        Run `rtstat routers` to list supported models.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Router profile to use
    #[arg(long, env = "RTSTAT_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Output format [default: from config, else json]
    #[arg(long, short = 'o', env = "RTSTAT_OUTPUT", global = true)]
    pub output: Option<OutputFormat>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress logging and status messages
    #[arg(long, short = 'q', global = true, conflicts_with = "verbose")]
    pub quiet: bool,
}

// ── Output Enum ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty-printed JSON with sorted keys
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Pretty table of flattened values
    Table,
    /// Plain `path=value` lines (scripting)
    Plain,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Connect to a router and print one statistics snapshot
    #[command(alias = "cap", alias = "c")]
    Capture(CaptureArgs),

    /// List supported router models
    Routers,

    /// Manage configuration and stored passwords
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CAPTURE
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Every flag overrides the matching profile value.
#[derive(Debug, Args)]
pub struct CaptureArgs {
    /// Router model and version to assume (e.g. TG585v8)
    #[arg(long, short = 'm', value_name = "MODEL")]
    pub router: Option<String>,

    /// Router telnet address to connect to
    #[arg(long, short = 'r', value_name = "HOST")]
    pub host: Option<String>,

    /// Router telnet port [default: 23]
    #[arg(long, short = 'p')]
    pub port: Option<u16>,

    /// Username to authenticate with [default: model specific]
    #[arg(long, short = 'u')]
    pub username: Option<String>,

    /// Password to authenticate with [default: model specific]
    #[arg(long, short = 'x', env = "RTSTAT_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Network timeout in milliseconds [default: 5000]
    #[arg(
        long,
        short = 't',
        value_name = "MS",
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub timeout: Option<u64>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create or extend the config file with a guided setup
    Init,

    /// Display the current configuration (secrets redacted)
    Show,

    /// Print the config file location
    Path,

    /// Store a profile password in the system keyring
    SetPassword,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}
