// Scripted in-memory transport used by driver and dispatcher tests.

use std::cell::RefCell;
use std::io;
use std::rc::Rc;
use std::time::Duration;

use crate::error::Error;
use crate::session::{Connector, Match, Session, find_earliest, timeout_error};

/// Canned console behaviour: what the device prints on connect and what it
/// answers to each line it receives.
#[derive(Debug, Clone, Default)]
pub struct FakeScript {
    greeting: String,
    replies: Vec<(String, String)>,
}

impl FakeScript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Text available to read as soon as the session opens.
    pub fn greeting(mut self, text: impl Into<String>) -> Self {
        self.greeting = text.into();
        self
    }

    /// Queue `output` whenever `line` is sent (trailing CR/LF ignored).
    /// Replies are reusable; the first matching entry wins.
    pub fn reply(mut self, line: impl Into<String>, output: impl Into<String>) -> Self {
        self.replies.push((line.into(), output.into()));
        self
    }

    fn reply_for(&self, sent: &str) -> Option<&str> {
        let line = sent.trim_end_matches(['\r', '\n']);
        self.replies
            .iter()
            .find(|(expected, _)| expected == line)
            .map(|(_, output)| output.as_str())
    }
}

#[derive(Debug, Default)]
struct JournalEntries {
    opens: usize,
    closes: usize,
    writes: Vec<String>,
}

/// Shared record of everything fake sessions were asked to do.
///
/// Cloning yields another handle onto the same record, so a test can keep
/// one while the connector's sessions are moved into the code under test.
#[derive(Debug, Clone, Default)]
pub struct FakeJournal {
    inner: Rc<RefCell<JournalEntries>>,
}

impl FakeJournal {
    /// Number of times `Connector::open` was invoked (including refusals).
    pub fn opens(&self) -> usize {
        self.inner.borrow().opens
    }

    /// Number of times `Session::close` was invoked.
    pub fn closes(&self) -> usize {
        self.inner.borrow().closes
    }

    /// Every chunk of text passed to `Session::send`, in order.
    pub fn writes(&self) -> Vec<String> {
        self.inner.borrow().writes.clone()
    }
}

/// In-memory [`Session`] replaying a [`FakeScript`].
///
/// A read whose pattern never shows up blocks for the full timeout and then
/// fails with [`Error::Timeout`], like a silent device would.
#[derive(Debug)]
pub struct FakeSession {
    script: FakeScript,
    buffer: String,
    journal: FakeJournal,
    closed: bool,
}

impl FakeSession {
    pub fn new(script: FakeScript) -> Self {
        Self::with_journal(script, FakeJournal::default())
    }

    fn with_journal(script: FakeScript, journal: FakeJournal) -> Self {
        Self {
            buffer: script.greeting.clone(),
            script,
            journal,
            closed: false,
        }
    }

    pub fn journal(&self) -> FakeJournal {
        self.journal.clone()
    }

    /// Output queued but not yet consumed by a read.
    pub fn pending(&self) -> &str {
        &self.buffer
    }
}

impl Session for FakeSession {
    fn send(&mut self, text: &str) -> Result<(), Error> {
        if self.closed {
            return Err(Error::Closed);
        }
        self.journal.inner.borrow_mut().writes.push(text.to_owned());
        if let Some(output) = self.script.reply_for(text) {
            self.buffer.push_str(output);
        }
        Ok(())
    }

    fn expect(&mut self, patterns: &[&str], timeout: Duration) -> Result<Match, Error> {
        if self.closed {
            return Err(Error::Closed);
        }
        if let Some((index, start, end)) = find_earliest(self.buffer.as_bytes(), patterns) {
            let text = self.buffer[..start].to_owned();
            self.buffer.drain(..end);
            return Ok(Match { index, text });
        }
        std::thread::sleep(timeout);
        Err(timeout_error(patterns, timeout, self.buffer.as_bytes()))
    }

    fn close(&mut self) -> Result<(), Error> {
        self.closed = true;
        self.journal.inner.borrow_mut().closes += 1;
        Ok(())
    }
}

/// [`Connector`] handing out [`FakeSession`]s that share one journal.
#[derive(Debug, Clone, Default)]
pub struct FakeConnector {
    script: FakeScript,
    journal: FakeJournal,
    refuse: bool,
}

impl FakeConnector {
    pub fn new(script: FakeScript) -> Self {
        Self {
            script,
            journal: FakeJournal::default(),
            refuse: false,
        }
    }

    /// A connector whose every `open` fails with connection refused.
    pub fn refusing() -> Self {
        Self {
            refuse: true,
            ..Self::default()
        }
    }

    pub fn journal(&self) -> FakeJournal {
        self.journal.clone()
    }
}

impl Connector for FakeConnector {
    type Session = FakeSession;

    fn open(&self, host: &str, port: u16) -> Result<FakeSession, Error> {
        self.journal.inner.borrow_mut().opens += 1;
        if self.refuse {
            return Err(Error::Connect {
                addr: format!("{host}:{port}"),
                source: io::Error::new(io::ErrorKind::ConnectionRefused, "connection refused"),
            });
        }
        Ok(FakeSession::with_journal(
            self.script.clone(),
            self.journal.clone(),
        ))
    }
}
