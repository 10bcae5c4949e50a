// ── Driver registry ──
//
// Maps router model keys to driver factories. The built-in table is fixed
// at compile time; callers wanting extra models build their own registry.

use std::sync::LazyLock;

use crate::config::Credentials;
use crate::driver::Driver;
use crate::drivers;
use crate::error::CoreError;

/// Builds a driver for one capture from that capture's credentials.
pub type DriverFactory = fn(&Credentials) -> Box<dyn Driver>;

static BUILTIN: LazyLock<Registry> =
    LazyLock::new(|| Registry::new().with(drivers::tg585v8::KEY, drivers::tg585v8));

/// Ordered table of `(model key, factory)` pairs.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    entries: Vec<(String, DriverFactory)>,
}

impl Registry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every driver shipped with this crate.
    pub fn builtin() -> &'static Registry {
        &BUILTIN
    }

    /// Builder form of [`Registry::register`].
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, factory: DriverFactory) -> Self {
        self.register(key, factory);
        self
    }

    /// Add or replace the factory for `key`.
    pub fn register(&mut self, key: impl Into<String>, factory: DriverFactory) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = factory,
            None => self.entries.push((key, factory)),
        }
    }

    /// Look up a factory. An exact key match wins; otherwise the first
    /// case-insensitive match is used.
    pub fn resolve(&self, key: &str) -> Option<DriverFactory> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .or_else(|| self.entries.iter().find(|(k, _)| k.eq_ignore_ascii_case(key)))
            .map(|(_, factory)| *factory)
    }

    /// Registered keys in registration order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Instantiate the driver registered under `key`.
    pub fn create(&self, key: &str, credentials: &Credentials) -> Result<Box<dyn Driver>, CoreError> {
        let factory = self.resolve(key).ok_or_else(|| CoreError::UnsupportedRouter {
            key: key.to_owned(),
            supported: self.keys().collect::<Vec<_>>().join(", "),
        })?;
        Ok(factory(credentials))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::console::Console;
    use crate::driver::Measurements;

    struct Null;

    impl Driver for Null {
        fn name(&self) -> &'static str {
            "null"
        }

        fn get_all_info(&self, _console: &mut Console<'_>) -> Result<Measurements, CoreError> {
            Ok(Measurements::new())
        }
    }

    fn null(_: &Credentials) -> Box<dyn Driver> {
        Box::new(Null)
    }

    #[test]
    fn builtin_contains_thomson() {
        let keys: Vec<_> = Registry::builtin().keys().collect();
        assert_eq!(keys, vec!["TG585v8"]);
        let driver = Registry::builtin()
            .create("TG585v8", &Credentials::default())
            .unwrap();
        assert_eq!(driver.name(), "Thomson TG585 v8");
    }

    #[test]
    fn lookup_falls_back_to_case_insensitive() {
        assert!(Registry::builtin().resolve("tg585V8").is_some());
        assert!(Registry::builtin().resolve("TG585").is_none());
    }

    #[test]
    fn exact_match_beats_case_insensitive() {
        let registry = Registry::new()
            .with("box", null)
            .with("BOX", drivers::tg585v8);
        let driver = registry.create("BOX", &Credentials::default()).unwrap();
        assert_eq!(driver.name(), "Thomson TG585 v8");
        let driver = registry.create("Box", &Credentials::default()).unwrap();
        assert_eq!(driver.name(), "null");
    }

    #[test]
    fn unknown_key_lists_supported_models() {
        let registry = Registry::new().with("a", null).with("b", null);
        let Err(err) = registry.create("c", &Credentials::default()) else {
            panic!("expected unsupported router");
        };
        match err {
            CoreError::UnsupportedRouter { key, supported } => {
                assert_eq!(key, "c");
                assert_eq!(supported, "a, b");
            }
            other => panic!("expected unsupported router, got {other:?}"),
        }
    }

    #[test]
    fn register_replaces_existing_key() {
        let mut registry = Registry::new().with("a", drivers::tg585v8);
        registry.register("a", null);
        assert_eq!(registry.keys().count(), 1);
        let driver = registry.create("a", &Credentials::default()).unwrap();
        assert_eq!(driver.name(), "null");
    }
}
