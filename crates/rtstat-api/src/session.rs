// Session and connector contracts shared by the telnet transport and the
// scripted fake used in tests.

use std::time::Duration;

use crate::error::Error;

/// Longest slice of unconsumed output carried inside a timeout error.
const PENDING_TAIL: usize = 256;

/// Result of a successful [`Session::expect`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    /// Index into the pattern slice of the pattern that matched.
    pub index: usize,
    /// Everything received before the matched pattern. The pattern itself
    /// is consumed but not included.
    pub text: String,
}

/// An open, bidirectional, line-oriented console connection.
///
/// Object safe: drivers receive `&mut dyn Session` and never learn which
/// transport sits underneath.
pub trait Session {
    /// Write `text` verbatim. Line terminators are the caller's business.
    fn send(&mut self, text: &str) -> Result<(), Error>;

    /// Block until one of `patterns` appears in the inbound stream or the
    /// deadline expires. When several patterns are present the one that
    /// starts earliest wins; ties go to the lower index.
    fn expect(&mut self, patterns: &[&str], timeout: Duration) -> Result<Match, Error>;

    /// Block until `pattern` appears, returning the text before it.
    fn read_until(&mut self, pattern: &str, timeout: Duration) -> Result<String, Error> {
        self.expect(&[pattern], timeout).map(|m| m.text)
    }

    /// Tear down the connection. Calling it twice is harmless.
    fn close(&mut self) -> Result<(), Error>;
}

/// Opens sessions to `host:port`.
pub trait Connector {
    type Session: Session;

    fn open(&self, host: &str, port: u16) -> Result<Self::Session, Error>;
}

/// Locate the earliest occurrence of any pattern in `haystack`.
///
/// Returns `(pattern index, match start, match end)`.
pub(crate) fn find_earliest(haystack: &[u8], patterns: &[&str]) -> Option<(usize, usize, usize)> {
    patterns
        .iter()
        .enumerate()
        .filter_map(|(index, pattern)| {
            let needle = pattern.as_bytes();
            let start = if needle.is_empty() {
                Some(0)
            } else {
                haystack.windows(needle.len()).position(|w| w == needle)
            }?;
            Some((index, start, start + needle.len()))
        })
        .min_by_key(|&(index, start, _)| (start, index))
}

/// Human-readable rendering of a pattern set for error messages.
pub(crate) fn describe_patterns(patterns: &[&str]) -> String {
    patterns
        .iter()
        .map(|p| format!("{p:?}"))
        .collect::<Vec<_>>()
        .join(" | ")
}

/// Last few hundred bytes of unconsumed output, lossily decoded.
pub(crate) fn pending_tail(buffer: &[u8]) -> String {
    let start = buffer.len().saturating_sub(PENDING_TAIL);
    String::from_utf8_lossy(&buffer[start..]).into_owned()
}

/// Build the timeout error for a pattern set.
#[allow(clippy::cast_possible_truncation, clippy::as_conversions)]
pub(crate) fn timeout_error(patterns: &[&str], timeout: Duration, buffer: &[u8]) -> Error {
    Error::Timeout {
        timeout_ms: timeout.as_millis() as u64,
        pattern: describe_patterns(patterns),
        pending: pending_tail(buffer),
    }
}
