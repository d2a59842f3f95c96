//! # Crate-wide defaults.
//!
//! Provides [`Config`] centralized defaults for tasks and the event bus.
//!
//! Config is used in two ways:
//! 1. **Task defaults**: [`TaskBuilder::with_config`](crate::TaskBuilder::with_config)
//! 2. **Bus creation**: [`Bus::from_config`](crate::Bus::from_config)
//!
//! ## Sentinel values
//! - `bus_capacity = 0` → clamped to 1

use crate::tasks::Mode;

/// Defaults shared by the tasks of one application.
///
/// ## Field semantics
/// - `default_mode`: admission mode for tasks that do not set one explicitly
/// - `bus_capacity`: event bus ring buffer size (min 1; clamped by Bus)
#[derive(Clone, Debug)]
pub struct Config {
    /// Admission mode used when a task is built without one.
    ///
    /// Used by `TaskBuilder::with_config()`. A mode set on the builder always wins,
    /// whether it is set before or after the config is applied.
    pub default_mode: Mode,

    /// Capacity of the event bus broadcast channel ring buffer.
    ///
    /// Slow receivers that lag behind more than `bus_capacity` messages will
    /// receive `Lagged` and skip older items.
    pub bus_capacity: usize,
}

impl Config {
    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `default_mode = Mode::Drop`
    /// - `bus_capacity = 1024`
    fn default() -> Self {
        Self {
            default_mode: Mode::default(),
            bus_capacity: 1024,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_drop_mode() {
        let cfg = Config::default();
        assert_eq!(cfg.default_mode, Mode::Drop);
        assert_eq!(cfg.bus_capacity, 1024);
    }

    #[test]
    fn zero_capacity_is_clamped() {
        let cfg = Config {
            bus_capacity: 0,
            ..Config::default()
        };
        assert_eq!(cfg.bus_capacity_clamped(), 1);
    }
}
