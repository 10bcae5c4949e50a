// Telnet transport over a blocking `TcpStream`.
//
// Router consoles speak a minimal subset of RFC 854: IAC command sequences
// are stripped from the inbound stream, every option the peer offers is
// refused, and everything else goes up as plain bytes. Reads are deadline
// based so a console that never prints its prompt turns into
// `Error::Timeout`.

use std::io::{self, Read, Write};
use std::net::{Shutdown, SocketAddr, TcpStream, ToSocketAddrs};
use std::time::{Duration, Instant};

use tracing::{debug, trace};

use crate::error::Error;
use crate::session::{Connector, Match, Session, find_earliest, timeout_error};

const IAC: u8 = 255;
const DONT: u8 = 254;
const DO: u8 = 253;
const WONT: u8 = 252;
const WILL: u8 = 251;
const SB: u8 = 250;
const SE: u8 = 240;

const READ_CHUNK: usize = 4096;

// ── Connector ───────────────────────────────────────────────────────

/// Opens [`TelnetSession`]s with a bounded TCP connect.
#[derive(Debug, Clone)]
pub struct TelnetConnector {
    connect_timeout: Duration,
}

impl TelnetConnector {
    pub fn new(connect_timeout: Duration) -> Self {
        Self { connect_timeout }
    }
}

impl Default for TelnetConnector {
    fn default() -> Self {
        Self::new(Duration::from_secs(5))
    }
}

impl Connector for TelnetConnector {
    type Session = TelnetSession;

    fn open(&self, host: &str, port: u16) -> Result<TelnetSession, Error> {
        TelnetSession::connect(host, port, self.connect_timeout)
    }
}

// ── Option negotiation ──────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum DecodeState {
    #[default]
    Data,
    Iac,
    Negotiate(u8),
    Sub,
    SubIac,
}

/// Incremental IAC stripper. Survives sequences split across reads.
#[derive(Debug, Default)]
struct Decoder {
    state: DecodeState,
}

impl Decoder {
    /// Feed raw socket bytes. Payload goes to `data`, negotiation answers to
    /// `replies`.
    fn feed(&mut self, input: &[u8], data: &mut Vec<u8>, replies: &mut Vec<u8>) {
        for &byte in input {
            self.state = match (self.state, byte) {
                (DecodeState::Data, IAC) => DecodeState::Iac,
                (DecodeState::Data, b) => {
                    data.push(b);
                    DecodeState::Data
                }
                (DecodeState::Iac, IAC) => {
                    data.push(IAC);
                    DecodeState::Data
                }
                (DecodeState::Iac, DO | DONT | WILL | WONT) => DecodeState::Negotiate(byte),
                (DecodeState::Iac, SB) => DecodeState::Sub,
                (DecodeState::Iac, _) => DecodeState::Data,
                (DecodeState::Negotiate(verb), option) => {
                    match verb {
                        DO => replies.extend_from_slice(&[IAC, WONT, option]),
                        WILL => replies.extend_from_slice(&[IAC, DONT, option]),
                        _ => {}
                    }
                    DecodeState::Data
                }
                (DecodeState::Sub, IAC) => DecodeState::SubIac,
                (DecodeState::Sub, _) => DecodeState::Sub,
                (DecodeState::SubIac, SE) => DecodeState::Data,
                (DecodeState::SubIac, _) => DecodeState::Sub,
            };
        }
    }
}

// ── Session ─────────────────────────────────────────────────────────

/// A live telnet connection to a router console.
pub struct TelnetSession {
    stream: TcpStream,
    peer: String,
    buffer: Vec<u8>,
    decoder: Decoder,
    eof: bool,
    closed: bool,
}

impl TelnetSession {
    /// Resolve `host` and try each address in turn with `timeout`.
    pub fn connect(host: &str, port: u16, timeout: Duration) -> Result<Self, Error> {
        let addrs: Vec<SocketAddr> = (host, port)
            .to_socket_addrs()
            .map_err(|source| Error::Resolve {
                host: host.to_owned(),
                source,
            })?
            .collect();

        let peer = format!("{host}:{port}");
        // connect_timeout rejects a zero duration outright
        let timeout = timeout.max(Duration::from_millis(1));
        let mut last_err = None;

        for addr in &addrs {
            debug!(%addr, "connecting");
            match TcpStream::connect_timeout(addr, timeout) {
                Ok(stream) => {
                    stream.set_nodelay(true)?;
                    debug!(%addr, "connected");
                    return Ok(Self::from_stream(stream, peer));
                }
                Err(e) => {
                    debug!(%addr, error = %e, "connect attempt failed");
                    last_err = Some(e);
                }
            }
        }

        Err(Error::Connect {
            addr: peer,
            source: last_err.unwrap_or_else(|| {
                io::Error::new(io::ErrorKind::NotFound, "host resolved to no addresses")
            }),
        })
    }

    /// Wrap an already-connected stream.
    pub fn from_stream(stream: TcpStream, peer: String) -> Self {
        Self {
            stream,
            peer,
            buffer: Vec::new(),
            decoder: Decoder::default(),
            eof: false,
            closed: false,
        }
    }

    /// Pull one chunk off the socket, answering any option negotiation.
    fn fill(&mut self, remaining: Duration) -> Result<bool, Error> {
        let mut chunk = [0u8; READ_CHUNK];
        self.stream.set_read_timeout(Some(remaining))?;
        loop {
            match self.stream.read(&mut chunk) {
                Ok(0) => {
                    self.eof = true;
                    return Ok(true);
                }
                Ok(n) => {
                    let mut replies = Vec::new();
                    self.decoder.feed(&chunk[..n], &mut self.buffer, &mut replies);
                    if !replies.is_empty() {
                        trace!(bytes = replies.len(), "refusing telnet options");
                        self.stream.write_all(&replies)?;
                    }
                    return Ok(true);
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e)
                    if matches!(
                        e.kind(),
                        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut
                    ) =>
                {
                    return Ok(false);
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}

impl Session for TelnetSession {
    fn send(&mut self, text: &str) -> Result<(), Error> {
        if self.closed {
            return Err(Error::Closed);
        }
        // UTF-8 never contains 0xFF, so no IAC escaping is needed outbound
        self.stream.write_all(text.as_bytes())?;
        self.stream.flush()?;
        trace!(bytes = text.len(), "sent");
        Ok(())
    }

    fn expect(&mut self, patterns: &[&str], timeout: Duration) -> Result<Match, Error> {
        let deadline = Instant::now() + timeout;
        loop {
            if let Some((index, start, end)) = find_earliest(&self.buffer, patterns) {
                let text = String::from_utf8_lossy(&self.buffer[..start]).into_owned();
                self.buffer.drain(..end);
                trace!(index, bytes = end, "pattern matched");
                return Ok(Match { index, text });
            }
            if self.eof || self.closed {
                return Err(Error::Closed);
            }
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() || !self.fill(remaining)? {
                return Err(timeout_error(patterns, timeout, &self.buffer));
            }
        }
    }

    fn close(&mut self) -> Result<(), Error> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        debug!(peer = %self.peer, "closing session");
        match self.stream.shutdown(Shutdown::Both) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotConnected => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
