use serde::{Deserialize, Serialize};

use crate::driver::Measurements;

/// One capture's result, emitted as a single JSON object.
///
/// Field order is alphabetical so the serialized form is stable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Measurements returned by the driver, keyed by category.
    pub data: Measurements,
    /// Display name of the driver that produced `data`.
    pub router: String,
    /// Seconds since the Unix epoch, taken right after the measurements
    /// were collected.
    pub timestamp: f64,
}

impl Snapshot {
    pub fn new(router: impl Into<String>, timestamp: f64, data: Measurements) -> Self {
        Self {
            data,
            router: router.into(),
            timestamp,
        }
    }
}
