//! Driver contract and capture pipeline between `rtstat-api` and the CLI.
//!
//! - **[`Driver`]**: One implementation per router model. Given a
//!   [`Console`] over an authenticated session it runs the vendor command
//!   sequence and returns a JSON object of measurements.
//!
//! - **[`Registry`]**: Static table from model key (e.g. `TG585v8`) to
//!   driver factory. Adding a router means adding one entry.
//!
//! - **[`Dispatcher`]**: Owns the transport lifecycle for a single
//!   [`capture()`](Dispatcher::capture): open, optional login, driver call,
//!   timestamp, logout, close. The session is closed on every exit path.
//!
//! - **[`Snapshot`]**: The `{router, timestamp, data}` envelope emitted once
//!   per invocation.

pub mod config;
pub mod console;
pub mod dispatcher;
pub mod driver;
pub mod drivers;
pub mod error;
pub mod registry;
pub mod snapshot;
pub mod text;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{CaptureOptions, Credentials, DEFAULT_PORT};
pub use console::Console;
pub use dispatcher::Dispatcher;
pub use driver::{Driver, Measurements};
pub use error::CoreError;
pub use registry::{DriverFactory, Registry};
pub use snapshot::Snapshot;
