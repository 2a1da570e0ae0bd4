//! Reconciler configuration.

use std::env;

/// Environment variable toggling development warnings.
///
/// `0`, `false` and `off` disable them; any other value enables them.
pub const DEV_WARNINGS_ENV: &str = "SPARK_RECONCILER_DEV";

/// Settings of one root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconcilerConfig {
    /// Emit `tracing` warnings for suspicious input (duplicate keys, nested
    /// lists, state slot drift, aborted passes).
    pub dev_warnings: bool,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            dev_warnings: cfg!(debug_assertions),
        }
    }
}

impl ReconcilerConfig {
    /// Defaults, overridden by [`DEV_WARNINGS_ENV`] when it is set.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(value) = env::var(DEV_WARNINGS_ENV) {
            config.dev_warnings = parse_flag(&value);
        }
        config
    }

    pub fn with_dev_warnings(mut self, enabled: bool) -> Self {
        self.dev_warnings = enabled;
        self
    }
}

fn parse_flag(value: &str) -> bool {
    !matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "0" | "false" | "off"
    )
}
