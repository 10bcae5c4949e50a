use std::io;

use thiserror::Error;

/// Top-level error type for the `rtstat-api` crate.
///
/// Covers every failure mode of a router console session: name
/// resolution, connection setup, read deadlines, and I/O on an established
/// stream. `rtstat-core` maps these into its capture taxonomy.
#[derive(Debug, Error)]
pub enum Error {
    // ── Connection ──────────────────────────────────────────────────
    /// Host name could not be resolved to any address.
    #[error("Could not resolve {host}: {source}")]
    Resolve {
        host: String,
        #[source]
        source: io::Error,
    },

    /// Every resolved address refused or timed out.
    #[error("Could not connect to {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: io::Error,
    },

    // ── Session ─────────────────────────────────────────────────────
    /// A blocking read hit its deadline before any expected pattern showed up.
    #[error("Timed out after {timeout_ms}ms waiting for {pattern}")]
    Timeout {
        timeout_ms: u64,
        pattern: String,
        /// Unconsumed output received before the deadline (tail only).
        pending: String,
    },

    /// Peer closed the stream before the expected pattern arrived.
    #[error("Connection closed by peer")]
    Closed,

    /// Any other socket-level failure.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    /// Returns `true` if the session was never established.
    pub fn is_connect(&self) -> bool {
        matches!(self, Self::Resolve { .. } | Self::Connect { .. })
    }
}
