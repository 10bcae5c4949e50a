// ── Runtime capture configuration ──
//
// These types describe *how* to reach a router and how long to wait for it.
// They carry credential data and timeouts but never touch disk; the CLI
// builds them from flags and profiles and hands them in.

use std::time::Duration;

use secrecy::SecretString;

/// Standard telnet port.
pub const DEFAULT_PORT: u16 = 23;

/// Login credentials for a router console.
///
/// Both fields are optional: each driver substitutes the factory defaults
/// of its model for whatever is missing.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    pub username: Option<String>,
    pub password: Option<SecretString>,
}

impl Credentials {
    pub fn new(username: Option<String>, password: Option<SecretString>) -> Self {
        Self { username, password }
    }
}

/// Timeouts applied to a single capture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureOptions {
    /// Deadline for every blocking read on the session.
    pub read_timeout: Duration,
    /// Deadline for establishing the TCP connection.
    pub connect_timeout: Duration,
}

impl CaptureOptions {
    /// Use one timeout for both connecting and reading.
    pub fn uniform(timeout: Duration) -> Self {
        Self {
            read_timeout: timeout,
            connect_timeout: timeout,
        }
    }
}

impl Default for CaptureOptions {
    fn default() -> Self {
        Self::uniform(Duration::from_millis(5000))
    }
}
