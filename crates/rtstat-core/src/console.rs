// Line-oriented view of a router session, handed to drivers.
//
// Applies the capture's read timeout to every read, sanitizes what comes
// back, and keeps secrets out of the logs.

use std::time::Duration;

use rtstat_api::Session;
use secrecy::{ExposeSecret, SecretString};
use tracing::trace;

use crate::error::CoreError;
use crate::text::sanitize;

/// Line terminator expected by router consoles.
pub const CRLF: &str = "\r\n";

/// A borrowed session plus the read deadline for the current capture.
pub struct Console<'a> {
    session: &'a mut dyn Session,
    timeout: Duration,
}

impl<'a> Console<'a> {
    pub fn new(session: &'a mut dyn Session, timeout: Duration) -> Self {
        Self { session, timeout }
    }

    /// Send `line` followed by CRLF.
    pub fn write_line(&mut self, line: &str) -> Result<(), CoreError> {
        trace!(line, "send");
        self.session.send(&format!("{line}{CRLF}"))?;
        Ok(())
    }

    /// Send a secret followed by CRLF without logging it.
    pub fn write_secret(&mut self, secret: &SecretString) -> Result<(), CoreError> {
        trace!("send <secret>");
        self.session
            .send(&format!("{}{CRLF}", secret.expose_secret()))?;
        Ok(())
    }

    /// Read up to (and consume) `pattern`; return the sanitized text before it.
    pub fn read_until(&mut self, pattern: &str) -> Result<String, CoreError> {
        let raw = self.session.read_until(pattern, self.timeout)?;
        trace!(pattern, bytes = raw.len(), "read");
        Ok(sanitize(&raw))
    }

    /// Read until any of `patterns`; return the matching index and the
    /// sanitized text before it.
    pub fn expect(&mut self, patterns: &[&str]) -> Result<(usize, String), CoreError> {
        let m = self.session.expect(patterns, self.timeout)?;
        trace!(index = m.index, bytes = m.text.len(), "read");
        Ok((m.index, sanitize(&m.text)))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rtstat_api::{FakeScript, FakeSession};

    use super::*;

    const SHORT: Duration = Duration::from_millis(20);

    #[test]
    fn lines_are_crlf_terminated() {
        let mut fake = FakeSession::new(FakeScript::new());
        let journal = fake.journal();
        let mut console = Console::new(&mut fake, SHORT);
        console.write_line("ip iflist").unwrap();
        console
            .write_secret(&SecretString::from("hunter2".to_string()))
            .unwrap();
        assert_eq!(
            journal.writes(),
            vec!["ip iflist\r\n".to_string(), "hunter2\r\n".to_string()]
        );
    }

    #[test]
    fn reads_are_sanitized() {
        let mut fake = FakeSession::new(FakeScript::new().greeting("line one\r\n\x1b{Admin}=>"));
        let mut console = Console::new(&mut fake, SHORT);
        assert_eq!(console.read_until("{Admin}").unwrap(), "line one\n");
        assert_eq!(console.read_until("=>").unwrap(), "");
    }

    #[test]
    fn timeouts_surface_as_transport_timeout() {
        let mut fake = FakeSession::new(FakeScript::new());
        let mut console = Console::new(&mut fake, SHORT);
        let err = console.read_until("=>").unwrap_err();
        assert!(matches!(err, CoreError::TransportTimeout { timeout_ms: 20, .. }));
    }
}
