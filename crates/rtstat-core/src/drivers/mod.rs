//! Built-in router drivers.

pub mod tg585v8;

pub use tg585v8::Tg585v8;

use crate::config::Credentials;
use crate::driver::Driver;

/// Factory for the Thomson TG585 v8.
pub fn tg585v8(credentials: &Credentials) -> Box<dyn Driver> {
    Box::new(Tg585v8::new(credentials))
}
