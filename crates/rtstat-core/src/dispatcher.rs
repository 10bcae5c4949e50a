// ── Capture pipeline ──
//
// Turns (model key, host, port, credentials) into one Snapshot. The
// dispatcher owns the session for the whole capture; drivers only ever
// borrow it through a Console.

use chrono::Utc;
use rtstat_api::{Connector, Session};
use tracing::{debug, info, warn};

use crate::config::{CaptureOptions, Credentials};
use crate::console::Console;
use crate::driver::{Driver, Measurements};
use crate::error::CoreError;
use crate::registry::Registry;
use crate::snapshot::Snapshot;

/// Runs single captures against routers reachable through `C`.
pub struct Dispatcher<'r, C> {
    registry: &'r Registry,
    connector: C,
    options: CaptureOptions,
}

impl<'r, C: Connector> Dispatcher<'r, C> {
    pub fn new(registry: &'r Registry, connector: C, options: CaptureOptions) -> Self {
        Self {
            registry,
            connector,
            options,
        }
    }

    /// Connect, measure, disconnect.
    ///
    /// The model key is resolved before any connection is attempted. Once a
    /// session is open it is closed exactly once, whatever the outcome;
    /// a failed close is logged and never masks the capture's own result.
    pub fn capture(
        &self,
        model_key: &str,
        host: &str,
        port: u16,
        credentials: &Credentials,
    ) -> Result<Snapshot, CoreError> {
        let driver = self.registry.create(model_key, credentials)?;
        debug!(model = model_key, driver = driver.name(), "resolved driver");

        let mut session = self.connector.open(host, port)?;
        info!(host, port, "connected");

        let outcome = self.run(driver.as_ref(), &mut session);

        if let Err(e) = session.close() {
            warn!(error = %e, "failed to close router session");
        }

        let (data, timestamp) = outcome?;
        Ok(Snapshot::new(driver.name(), timestamp, data))
    }

    fn run(
        &self,
        driver: &dyn Driver,
        session: &mut C::Session,
    ) -> Result<(Measurements, f64), CoreError> {
        let mut console = Console::new(session, self.options.read_timeout);

        if !driver.requires_login() {
            let data = driver.get_all_info(&mut console)?;
            return Ok((data, unix_timestamp()));
        }

        driver.login(&mut console)?;
        let outcome = driver
            .get_all_info(&mut console)
            .map(|data| (data, unix_timestamp()));

        if let Err(e) = driver.logout(&mut console) {
            warn!(error = %e, "logout failed");
        }
        outcome
    }
}

/// Current time as fractional Unix seconds.
#[allow(clippy::cast_precision_loss, clippy::as_conversions)]
fn unix_timestamp() -> f64 {
    Utc::now().timestamp_micros() as f64 / 1_000_000.0
}
