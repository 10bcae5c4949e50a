// ── Core error types ──
//
// User-facing capture errors. Consumers never see raw socket errors
// directly: the `From<rtstat_api::Error>` impl sorts transport failures into
// connection, timeout, and session-level variants.

use thiserror::Error;

/// Longest raw excerpt kept in a parse error.
const SNIPPET_LIMIT: usize = 160;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Configuration errors ─────────────────────────────────────────
    #[error("Unsupported router model '{key}' (supported: {supported})")]
    UnsupportedRouter { key: String, supported: String },

    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot connect to router at {addr}: {reason}")]
    Connection { addr: String, reason: String },

    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    #[error("Router did not answer within {timeout_ms}ms")]
    TransportTimeout {
        timeout_ms: u64,
        /// Output received before the deadline (tail only).
        pending: String,
    },

    #[error("Router session failed: {message}")]
    Transport { message: String },

    // ── Data errors ──────────────────────────────────────────────────
    #[error("Unrecognized '{section}' output: {reason}")]
    Parse {
        /// Measurement section being parsed (usually the vendor command).
        section: String,
        reason: String,
        /// Raw text that failed to parse, truncated.
        snippet: String,
    },

    #[error("Failed to encode measurements: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CoreError {
    /// Build a `Parse` error, truncating the raw excerpt.
    pub fn parse(section: &str, reason: impl Into<String>, raw: &str) -> Self {
        let snippet = match raw.char_indices().nth(SNIPPET_LIMIT) {
            Some((cut, _)) => format!("{}…", &raw[..cut]),
            None => raw.to_owned(),
        };
        Self::Parse {
            section: section.to_owned(),
            reason: reason.into(),
            snippet,
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<rtstat_api::Error> for CoreError {
    fn from(err: rtstat_api::Error) -> Self {
        match err {
            rtstat_api::Error::Resolve { host, source } => CoreError::Connection {
                addr: host,
                reason: source.to_string(),
            },
            rtstat_api::Error::Connect { addr, source } => CoreError::Connection {
                addr,
                reason: source.to_string(),
            },
            rtstat_api::Error::Timeout {
                timeout_ms,
                pending,
                ..
            } => CoreError::TransportTimeout {
                timeout_ms,
                pending,
            },
            other @ (rtstat_api::Error::Closed | rtstat_api::Error::Io(_)) => {
                CoreError::Transport {
                    message: other.to_string(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use super::*;

    #[test]
    fn connect_maps_to_connection() {
        let err: CoreError = rtstat_api::Error::Connect {
            addr: "10.0.0.138:23".into(),
            source: io::Error::new(io::ErrorKind::ConnectionRefused, "refused"),
        }
        .into();
        assert!(matches!(err, CoreError::Connection { ref addr, .. } if addr == "10.0.0.138:23"));
    }

    #[test]
    fn timeout_keeps_pending_output() {
        let err: CoreError = rtstat_api::Error::Timeout {
            timeout_ms: 5000,
            pattern: "\"=>\"".into(),
            pending: "Modem state".into(),
        }
        .into();
        match err {
            CoreError::TransportTimeout {
                timeout_ms,
                pending,
            } => {
                assert_eq!(timeout_ms, 5000);
                assert_eq!(pending, "Modem state");
            }
            other => panic!("expected timeout, got {other:?}"),
        }
    }

    #[test]
    fn closed_maps_to_transport() {
        let err: CoreError = rtstat_api::Error::Closed.into();
        assert!(matches!(err, CoreError::Transport { .. }));
    }

    #[test]
    fn parse_snippet_is_truncated() {
        let raw = "x".repeat(SNIPPET_LIMIT * 2);
        match CoreError::parse("ip iflist", "bad row", &raw) {
            CoreError::Parse { snippet, .. } => {
                assert_eq!(snippet.chars().count(), SNIPPET_LIMIT + 1);
                assert!(snippet.ends_with('…'));
            }
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn unsupported_router_lists_supported_models() {
        let err = CoreError::UnsupportedRouter {
            key: "WRT54G".into(),
            supported: "TG585v8".into(),
        };
        assert_eq!(
            err.to_string(),
            "Unsupported router model 'WRT54G' (supported: TG585v8)"
        );
    }
}
