#![allow(clippy::unwrap_used)]
// Integration tests for `Dispatcher::capture` against scripted fake sessions.

use std::time::{Duration, Instant};

use chrono::Utc;
use pretty_assertions::assert_eq;
use secrecy::SecretString;
use serde_json::json;

use rtstat_api::{FakeConnector, FakeScript};
use rtstat_core::console::CRLF;
use rtstat_core::{
    CaptureOptions, Console, CoreError, Credentials, Dispatcher, Driver, Measurements, Registry,
    Snapshot,
};

const QUICK: Duration = Duration::from_millis(100);

// ── Helpers ─────────────────────────────────────────────────────────

const BANNER: &str = "\r\n\
    ------------------------------------------------------------------------\r\n\
    \r\n\
    \x20                            ______  Thomson TG585 v8\r\n\
    \x20                        ___/_____/\\\r\n\
    \x20                       /         /\\  8.2.7.8\r\n\
    \x20                 _____/__       /  \\\r\n\
    \r\n\
    ------------------------------------------------------------------------\r\n";

const XDSL_INFO: &str = "Modem state:                    up\r\n\
    Up time (Days hh:mm:ss):        0 days, 1:00:30\r\n\
    xDSL Type:                      G.992.1 (G.dmt) Annex A\r\n\
    Bandwidth (Down/Up - kbit/s):   8000/800\r\n";

const IFLIST: &str = "Nr Intf Name                       MTU    TX          RX          Status\r\n\
    0  ip   loop.....................  65535  1064312     1270532     [UP]\r\n\
    1  ip   Internet.................  1500   394918736   18908913    [UP]\r\n\
    2  ip   LocalNetwork.............  1500   52231       901         [UP]\r\n";

/// A TG585 v8 console accepting `user` / `password`.
fn thomson(user: &str, password: &str) -> FakeScript {
    let prompt = format!("{{{user}}}=>");
    FakeScript::new()
        .greeting(format!("{BANNER}Username : "))
        .reply(user, format!("{user}{CRLF}Password : "))
        .reply(password, format!("{BANNER}{prompt}"))
        .reply("..", format!("..{CRLF}{prompt}"))
        .reply("xdsl info", format!("xdsl info{CRLF}{XDSL_INFO}{prompt}"))
        .reply("ip iflist", format!("ip iflist{CRLF}{IFLIST}{prompt}"))
        .reply("exit", format!("exit{CRLF}"))
}

#[allow(clippy::cast_precision_loss, clippy::as_conversions)]
fn now() -> f64 {
    Utc::now().timestamp_micros() as f64 / 1_000_000.0
}

fn capture(
    connector: FakeConnector,
    key: &str,
    credentials: &Credentials,
) -> Result<Snapshot, CoreError> {
    Dispatcher::new(Registry::builtin(), connector, CaptureOptions::uniform(QUICK))
        .capture(key, "192.168.1.254", 23, credentials)
}

// ── Driver used to exercise the extension point ─────────────────────

/// Minimal console answering `info` with `name rx=N tx=N` lines.
struct LineStats;

impl Driver for LineStats {
    fn name(&self) -> &'static str {
        "Line Stats Box"
    }

    fn get_all_info(&self, console: &mut Console<'_>) -> Result<Measurements, CoreError> {
        console.read_until("> ")?;
        console.write_line("info")?;
        console.read_until(CRLF)?;
        let output = console.read_until("> ")?;

        let mut iflist = serde_json::Map::new();
        for line in output.lines() {
            let Some((name, counters)) = line.split_once(' ') else {
                continue;
            };
            let mut entry = serde_json::Map::new();
            for pair in counters.split_whitespace() {
                let (key, value) = pair
                    .split_once('=')
                    .ok_or_else(|| CoreError::parse("info", "expected key=value", line))?;
                let value: u64 = value
                    .parse()
                    .map_err(|_| CoreError::parse("info", "counter is not a number", line))?;
                entry.insert(key.to_owned(), value.into());
            }
            iflist.insert(name.to_owned(), entry.into());
        }

        let mut data = Measurements::new();
        data.insert("iflist".into(), iflist.into());
        Ok(data)
    }
}

fn line_stats(_: &Credentials) -> Box<dyn Driver> {
    Box::new(LineStats)
}

// ── Successful captures ─────────────────────────────────────────────

#[test]
fn test_capture_thomson_snapshot() {
    let connector = FakeConnector::new(thomson("Administrator", ""));
    let journal = connector.journal();

    let before = now();
    let snapshot = capture(connector, "TG585v8", &Credentials::default()).unwrap();
    let after = now();

    assert_eq!(snapshot.router, "Thomson TG585 v8");
    assert!(
        (before..=after).contains(&snapshot.timestamp),
        "timestamp {} outside [{before}, {after}]",
        snapshot.timestamp
    );
    assert_eq!(
        serde_json::Value::Object(snapshot.data),
        json!({
            "iflist": {
                "Internet": { "rx": 18_908_913, "tx": 394_918_736 },
                "LocalNetwork": { "rx": 901, "tx": 52231 },
                "loop": { "rx": 1_270_532, "tx": 1_064_312 },
            },
            "xdsl-info": {
                "bandwidth-down": 1_000_000,
                "bandwidth-up": 100_000,
                "state": "up",
                "type": "G.992.1 (G.dmt) Annex A",
                "uptime": 3630,
            },
        })
    );

    assert_eq!(journal.opens(), 1);
    assert_eq!(journal.closes(), 1);
    assert_eq!(journal.writes().last().map(String::as_str), Some("exit\r\n"));
}

#[test]
fn test_snapshot_has_exactly_three_keys() {
    let snapshot = capture(
        FakeConnector::new(thomson("Administrator", "")),
        "TG585v8",
        &Credentials::default(),
    )
    .unwrap();

    let value = serde_json::to_value(&snapshot).unwrap();
    let keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
    assert_eq!(keys, vec!["data", "router", "timestamp"]);
    assert!(value["timestamp"].is_f64());
}

#[test]
fn test_model_key_is_case_insensitive() {
    let snapshot = capture(
        FakeConnector::new(thomson("Administrator", "")),
        "tg585V8",
        &Credentials::default(),
    )
    .unwrap();
    assert_eq!(snapshot.router, "Thomson TG585 v8");
}

#[test]
fn test_capture_uses_supplied_credentials() {
    let connector = FakeConnector::new(thomson("admin", "s3cret"));
    let journal = connector.journal();
    let credentials = Credentials::new(
        Some("admin".into()),
        Some(SecretString::from("s3cret".to_string())),
    );

    capture(connector, "TG585v8", &credentials).unwrap();

    let writes = journal.writes();
    assert_eq!(writes[0], "admin\r\n");
    assert_eq!(writes[1], "s3cret\r\n");
}

#[test]
fn test_snapshot_round_trips_through_json() {
    let snapshot = capture(
        FakeConnector::new(thomson("Administrator", "")),
        "TG585v8",
        &Credentials::default(),
    )
    .unwrap();

    let text = serde_json::to_string_pretty(&snapshot).unwrap();
    let back: Snapshot = serde_json::from_str(&text).unwrap();
    assert_eq!(back, snapshot);

    let value: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert!(value["data"]["iflist"]["Internet"]["tx"].is_u64());
    assert!(value["data"]["xdsl-info"]["state"].is_string());
}

#[test]
fn test_custom_driver_parses_info_lines() {
    let registry = Registry::new().with("linestats", line_stats);
    let script = FakeScript::new().greeting("> ").reply(
        "info",
        "info\r\nlan rx=18908913 tx=394918736\r\nwan rx=1 tx=2\r\n> ",
    );
    let connector = FakeConnector::new(script);
    let journal = connector.journal();

    let snapshot = Dispatcher::new(&registry, connector, CaptureOptions::uniform(QUICK))
        .capture("linestats", "10.0.0.1", 23, &Credentials::default())
        .unwrap();

    assert_eq!(snapshot.router, "Line Stats Box");
    assert_eq!(
        snapshot.data["iflist"]["lan"],
        json!({ "rx": 18_908_913, "tx": 394_918_736 })
    );
    // No login hooks for drivers that do not ask for them.
    assert_eq!(journal.writes(), vec!["info\r\n".to_string()]);
    assert_eq!(journal.closes(), 1);
}

// ── Failure paths ───────────────────────────────────────────────────

#[test]
fn test_unknown_model_never_connects() {
    let connector = FakeConnector::new(thomson("Administrator", ""));
    let journal = connector.journal();

    let result = capture(connector, "WRT54G", &Credentials::default());

    assert!(
        matches!(result, Err(CoreError::UnsupportedRouter { ref key, .. }) if key == "WRT54G"),
        "expected UnsupportedRouter, got: {result:?}"
    );
    assert_eq!(journal.opens(), 0);
}

#[test]
fn test_refused_connection_is_never_closed() {
    let connector = FakeConnector::refusing();
    let journal = connector.journal();

    let result = capture(connector, "TG585v8", &Credentials::default());

    assert!(
        matches!(result, Err(CoreError::Connection { ref addr, .. }) if addr == "192.168.1.254:23"),
        "expected Connection error, got: {result:?}"
    );
    assert_eq!(journal.opens(), 1);
    assert_eq!(journal.closes(), 0);
}

#[test]
fn test_parse_failure_still_closes_once() {
    // `xdsl info` answers without the uptime and bandwidth lines.
    let broken = FakeScript::new()
        .greeting("Username : ")
        .reply("Administrator", "Password : ")
        .reply("", "{Administrator}=>")
        .reply("..", "..\r\n{Administrator}=>")
        .reply("xdsl info", "xdsl info\r\nModem state: up\r\n{Administrator}=>")
        .reply("exit", "exit\r\n");
    let connector = FakeConnector::new(broken);
    let journal = connector.journal();

    let result = capture(connector, "TG585v8", &Credentials::default());

    match result {
        Err(CoreError::Parse { section, .. }) => assert_eq!(section, "xdsl info"),
        other => panic!("expected Parse error, got: {other:?}"),
    }
    assert_eq!(journal.closes(), 1);
    // Logout still runs after a successful login.
    assert_eq!(journal.writes().last().map(String::as_str), Some("exit\r\n"));
}

#[test]
fn test_rejected_password_is_authentication_error() {
    let script = FakeScript::new()
        .greeting("Username : ")
        .reply("Administrator", "Administrator\r\nPassword : ")
        .reply("wrong", "\r\nInvalid username/password\r\nUsername : ");
    let connector = FakeConnector::new(script);
    let journal = connector.journal();
    let credentials = Credentials::new(None, Some(SecretString::from("wrong".to_string())));

    let result = capture(connector, "TG585v8", &credentials);

    assert!(
        matches!(result, Err(CoreError::Authentication { .. })),
        "expected Authentication error, got: {result:?}"
    );
    assert_eq!(journal.closes(), 1);
    assert!(!journal.writes().contains(&"exit\r\n".to_string()));
}

#[test]
fn test_silent_router_times_out() {
    // Nothing answers `ip iflist`.
    let script = FakeScript::new()
        .greeting("Username : ")
        .reply("Administrator", "Password : ")
        .reply("", "{Administrator}=>")
        .reply("..", "..\r\n{Administrator}=>")
        .reply("xdsl info", format!("xdsl info\r\n{XDSL_INFO}{{Administrator}}=>"));
    let connector = FakeConnector::new(script);
    let journal = connector.journal();

    let started = Instant::now();
    let result = capture(connector, "TG585v8", &Credentials::default());
    let elapsed = started.elapsed();

    assert!(
        matches!(result, Err(CoreError::TransportTimeout { timeout_ms: 100, .. })),
        "expected TransportTimeout, got: {result:?}"
    );
    assert!(elapsed >= QUICK, "returned after {elapsed:?}");
    assert!(elapsed < Duration::from_secs(5), "took {elapsed:?}");
    assert_eq!(journal.closes(), 1);
}
