// rtstat-api: Blocking line-oriented transport for router consoles (telnet)

pub mod error;
pub mod fake;
pub mod session;
pub mod telnet;

pub use error::Error;
pub use fake::{FakeConnector, FakeJournal, FakeScript, FakeSession};
pub use session::{Connector, Match, Session};
pub use telnet::{TelnetConnector, TelnetSession};
