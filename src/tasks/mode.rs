//! # Per-task admission mode
//!
//! A task treats its operations as one **slot**: at any given time at most one
//! operation is the task's current unit of work.
//! When `perform` arrives while an operation is in flight, the mode decides what to do.
//!
//! ## Variants
//! - `Drop`: **ignore** the new request and hand back the in-flight settlement.
//! - `Restart`: **cancel** every existing operation and start the new one.
//! - `KeepLatest`: **queue** the new request unless one is already queued.
//! - `Enqueue`: **queue** the new request (FIFO).
//!
//! ## Invariants
//! - Queued operations start strictly in submission order, one at a time.
//! - `KeepLatest` keeps at most one queued successor; the first queued request wins.

use std::fmt;
use std::str::FromStr;

use crate::error::TaskError;

/// Policy controlling how new invocations are handled when a task is busy.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Skip the invocation if an operation is already running.
    ///
    /// Example: a "save" button that must not fire twice.
    #[default]
    Drop,

    /// Cancel the running operation and start the new one immediately.
    ///
    /// Example: type-ahead search (a new query invalidates the old one).
    Restart,

    /// Run the current operation to completion, then run one queued successor.
    ///
    /// Example: refresh requests that pile up while a refresh is running.
    KeepLatest,

    /// Queue every invocation and run them sequentially.
    ///
    /// Example: ordered writes.
    Enqueue,
}

impl Mode {
    /// All supported modes.
    pub const ALL: [Mode; 4] = [Mode::Drop, Mode::Restart, Mode::KeepLatest, Mode::Enqueue];

    /// Canonical name of the mode.
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Drop => "drop",
            Mode::Restart => "restart",
            Mode::KeepLatest => "keepLatest",
            Mode::Enqueue => "enqueue",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = TaskError;

    /// Parses a mode name.
    ///
    /// # Example
    /// ```
    /// use taskgen::Mode;
    ///
    /// assert_eq!("keepLatest".parse::<Mode>().unwrap(), Mode::KeepLatest);
    /// assert_eq!("keep_latest".parse::<Mode>().unwrap(), Mode::KeepLatest);
    /// assert!("bogus".parse::<Mode>().is_err());
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "drop" => Ok(Mode::Drop),
            "restart" => Ok(Mode::Restart),
            "keepLatest" | "keep_latest" | "keep-latest" => Ok(Mode::KeepLatest),
            "enqueue" => Ok(Mode::Enqueue),
            other => Err(TaskError::UnsupportedMode {
                mode: other.to_string(),
            }),
        }
    }
}

/// Mode as configured on a task: either supported, or the raw name that failed to parse.
///
/// An unsupported name does not fail construction; it is reported by every `perform`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum ModeSetting {
    Supported(Mode),
    Unsupported(String),
}

impl ModeSetting {
    pub(crate) fn from_name(name: &str) -> Self {
        match name.parse() {
            Ok(mode) => ModeSetting::Supported(mode),
            Err(_) => ModeSetting::Unsupported(name.to_string()),
        }
    }

    pub(crate) fn resolve(&self) -> Result<Mode, TaskError> {
        match self {
            ModeSetting::Supported(mode) => Ok(*mode),
            ModeSetting::Unsupported(mode) => Err(TaskError::UnsupportedMode {
                mode: mode.clone(),
            }),
        }
    }

    pub(crate) fn supported(&self) -> Option<Mode> {
        match self {
            ModeSetting::Supported(mode) => Some(*mode),
            ModeSetting::Unsupported(_) => None,
        }
    }
}
