// Capability contract every router driver implements.

use serde_json::{Map, Value};

use crate::console::Console;
use crate::error::CoreError;

/// Driver output: top-level keys are measurement categories chosen by the
/// driver (`iflist`, `xdsl-info`, ...), values are arbitrary JSON.
pub type Measurements = Map<String, Value>;

/// One router model's command sequence and output parsing.
///
/// Drivers are built by a [`crate::DriverFactory`] with the capture's
/// credentials, used for exactly one capture, then dropped. They hold no
/// connection state; the [`Console`] is lent to them per call.
pub trait Driver {
    /// Human-readable router identification, e.g. `Thomson TG585 v8`.
    fn name(&self) -> &'static str;

    /// Whether [`Driver::login`] must run before [`Driver::get_all_info`].
    fn requires_login(&self) -> bool {
        false
    }

    /// Authenticate on a freshly opened session, leaving it at the
    /// top-level prompt.
    fn login(&self, _console: &mut Console<'_>) -> Result<(), CoreError> {
        Ok(())
    }

    /// Leave the console politely. Called after a successful login whether
    /// or not the measurement call succeeded; failures are only logged.
    fn logout(&self, _console: &mut Console<'_>) -> Result<(), CoreError> {
        Ok(())
    }

    /// Run every measurement section and return the combined result.
    ///
    /// A parse failure in any section fails the whole call. The driver may
    /// move the console between command groups but must not close it.
    fn get_all_info(&self, console: &mut Console<'_>) -> Result<Measurements, CoreError>;
}
