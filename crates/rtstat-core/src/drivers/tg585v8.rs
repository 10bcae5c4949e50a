//! Thomson (SpeedTouch) TG585 v8 ADSL gateway.
//!
//! Usually found on 192.168.1.254. The console asks for a username and a
//! password, prints a banner, then shows one of two prompt shapes:
//!
//! - `{Administrator}=>` for top-level commands
//! - `{Administrator}[group]=>` inside a command group
//!
//! Every command is echoed back before its output.

use std::collections::BTreeMap;

use secrecy::SecretString;
use serde::Serialize;
use tracing::debug;

use crate::config::Credentials;
use crate::console::{CRLF, Console};
use crate::driver::{Driver, Measurements};
use crate::error::CoreError;
use crate::text::parse_key_value;

/// Registry key.
pub const KEY: &str = "TG585v8";

const NAME: &str = "Thomson TG585 v8";
const DEFAULT_USERNAME: &str = "Administrator";

const USERNAME_PROMPT: &str = "Username : ";
const PASSWORD_PROMPT: &str = "Password : ";
const LOGIN_REJECTED: &str = "Invalid username";
const PROMPT_TAIL: &str = "=>";

/// Deepest command group nesting the console allows.
const MAX_GROUP_DEPTH: usize = 4;

const XDSL_INFO: &str = "xdsl info";
const IP_IFLIST: &str = "ip iflist";

const UPTIME_FIELD: &str = "Up time (Days hh:mm:ss)";
const BANDWIDTH_FIELD: &str = "Bandwidth (Down/Up - kbit/s)";

// ── Parsed sections ─────────────────────────────────────────────────

/// DSL line status from `xdsl info`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct XdslInfo {
    /// Modem state as printed by the router (`up`, `down`, `training`...).
    pub state: String,
    /// Seconds since the line last synced.
    pub uptime: u64,
    /// Line type, e.g. `G.992.5 (ADSL2+) Annex A`.
    #[serde(rename = "type")]
    pub line_type: String,
    /// Downstream sync rate in bytes per second.
    pub bandwidth_down: u64,
    /// Upstream sync rate in bytes per second.
    pub bandwidth_up: u64,
}

impl XdslInfo {
    pub fn parse(output: &str) -> Result<Self, CoreError> {
        let kv = parse_key_value(output, ':');
        let field = |key: &str| {
            kv.get(key)
                .map(String::as_str)
                .ok_or_else(|| CoreError::parse(XDSL_INFO, format!("missing field '{key}'"), output))
        };

        let uptime_raw = field(UPTIME_FIELD)?;
        let uptime = parse_uptime(uptime_raw).ok_or_else(|| {
            CoreError::parse(XDSL_INFO, format!("bad uptime '{uptime_raw}'"), output)
        })?;

        let bandwidth_raw = field(BANDWIDTH_FIELD)?;
        let (bandwidth_down, bandwidth_up) = parse_bandwidth(bandwidth_raw).ok_or_else(|| {
            CoreError::parse(XDSL_INFO, format!("bad bandwidth '{bandwidth_raw}'"), output)
        })?;

        Ok(Self {
            state: field("Modem state")?.to_owned(),
            uptime,
            line_type: field("xDSL Type")?.to_owned(),
            bandwidth_down,
            bandwidth_up,
        })
    }
}

/// Byte counters for one row of `ip iflist`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct InterfaceCounters {
    pub tx: u64,
    pub rx: u64,
}

/// Parse the `ip iflist` table into per-interface counters.
///
/// The first non-blank line is the column header. In each row the dotted
/// leaders are removed, then columns are whitespace separated: column 2 is
/// the interface name, 4 the transmitted bytes, 5 the received bytes.
pub fn parse_iflist(output: &str) -> Result<BTreeMap<String, InterfaceCounters>, CoreError> {
    let mut lines = output.lines().skip_while(|l| l.trim().is_empty());
    if lines.next().is_none() {
        return Err(CoreError::parse(IP_IFLIST, "empty output", output));
    }

    let mut interfaces = BTreeMap::new();
    for line in lines {
        let cleaned = line.replace('.', "");
        let tokens: Vec<&str> = cleaned.split_whitespace().collect();
        if tokens.is_empty() {
            continue;
        }

        let [_, _, name, _, tx, rx, ..] = tokens.as_slice() else {
            return Err(CoreError::parse(
                IP_IFLIST,
                format!("expected at least 6 columns, got {}", tokens.len()),
                line,
            ));
        };
        let counter = |raw: &str, column: &str| {
            raw.parse::<u64>().map_err(|_| {
                CoreError::parse(IP_IFLIST, format!("{column} counter '{raw}' is not a number"), line)
            })
        };

        interfaces.insert(
            (*name).to_owned(),
            InterfaceCounters {
                tx: counter(tx, "tx")?,
                rx: counter(rx, "rx")?,
            },
        );
    }

    if interfaces.is_empty() {
        return Err(CoreError::parse(IP_IFLIST, "no interface rows", output));
    }
    Ok(interfaces)
}

/// `2 days, 3:04:05` → seconds.
fn parse_uptime(raw: &str) -> Option<u64> {
    let (days, clock) = raw.split_once(',')?;
    let days: u64 = days.split_whitespace().next()?.parse().ok()?;

    let mut parts = clock.trim().split(':').map(|p| p.parse::<u64>().ok());
    let (Some(Some(h)), Some(Some(m)), Some(Some(s)), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return None;
    };
    if h >= 24 || m >= 60 || s >= 60 {
        return None;
    }
    days.checked_mul(86_400)?.checked_add(h * 3_600 + m * 60 + s)
}

/// `16000/1024` (kbit/s) → bytes per second, down and up.
fn parse_bandwidth(raw: &str) -> Option<(u64, u64)> {
    let (down, up) = raw.split_once('/')?;
    let to_bytes = |kbit: &str| Some(kbit.trim().parse::<u64>().ok()?.checked_mul(1000)? / 8);
    Some((to_bytes(down)?, to_bytes(up)?))
}

// ── Driver ──────────────────────────────────────────────────────────

/// Telnet driver for the TG585 v8.
pub struct Tg585v8 {
    username: String,
    password: SecretString,
}

impl Tg585v8 {
    /// Missing credentials fall back to the factory defaults
    /// (`Administrator`, empty password).
    pub fn new(credentials: &Credentials) -> Self {
        Self {
            username: credentials
                .username
                .clone()
                .unwrap_or_else(|| DEFAULT_USERNAME.into()),
            password: credentials
                .password
                .clone()
                .unwrap_or_else(|| SecretString::from(String::new())),
        }
    }

    /// `{User}`, the part of the prompt shared by every command group.
    fn prompt_head(&self) -> String {
        format!("{{{}}}", self.username)
    }

    /// Run one command and return what it printed between the echoed
    /// command line and the next prompt. Empty for group changes like `..`.
    pub fn send(&self, console: &mut Console<'_>, command: &str) -> Result<String, CoreError> {
        console.write_line(command)?;
        console.read_until(CRLF)?;
        let output = console.read_until(&self.prompt_head())?;
        console.read_until(PROMPT_TAIL)?;
        Ok(output)
    }

    /// Climb back to the top-level command group.
    pub fn reset_level(&self, console: &mut Console<'_>) -> Result<(), CoreError> {
        for _ in 0..MAX_GROUP_DEPTH {
            self.send(console, "..")?;
        }
        Ok(())
    }

    /// Keep an idle session from being dropped by the router.
    pub fn keepalive(&self, console: &mut Console<'_>) -> Result<(), CoreError> {
        self.send(console, "help").map(drop)
    }

    pub fn xdsl_info(&self, console: &mut Console<'_>) -> Result<XdslInfo, CoreError> {
        self.reset_level(console)?;
        XdslInfo::parse(&self.send(console, XDSL_INFO)?)
    }

    pub fn iflist(
        &self,
        console: &mut Console<'_>,
    ) -> Result<BTreeMap<String, InterfaceCounters>, CoreError> {
        self.reset_level(console)?;
        parse_iflist(&self.send(console, IP_IFLIST)?)
    }
}

impl Driver for Tg585v8 {
    fn name(&self) -> &'static str {
        NAME
    }

    fn requires_login(&self) -> bool {
        true
    }

    fn login(&self, console: &mut Console<'_>) -> Result<(), CoreError> {
        console.read_until(USERNAME_PROMPT)?;
        console.write_line(&self.username)?;
        console.read_until(PASSWORD_PROMPT)?;
        console.write_secret(&self.password)?;

        // The banner sits between the password and the first prompt.
        let prompt = format!("{}{PROMPT_TAIL}", self.prompt_head());
        let (index, _) = console.expect(&[&prompt, USERNAME_PROMPT, LOGIN_REJECTED])?;
        if index != 0 {
            return Err(CoreError::Authentication {
                message: format!("router rejected credentials for user '{}'", self.username),
            });
        }

        debug!(user = %self.username, "logged in");
        Ok(())
    }

    fn logout(&self, console: &mut Console<'_>) -> Result<(), CoreError> {
        console.write_line("exit")
    }

    fn get_all_info(&self, console: &mut Console<'_>) -> Result<Measurements, CoreError> {
        let xdsl = self.xdsl_info(console)?;
        let iflist = self.iflist(console)?;

        let mut data = Measurements::new();
        data.insert("xdsl-info".into(), serde_json::to_value(xdsl)?);
        data.insert("iflist".into(), serde_json::to_value(iflist)?);
        Ok(data)
    }
}
