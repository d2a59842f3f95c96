//! Error types surfaced by tasks and operations.
//!
//! [`TaskError`] is the single error enum of the crate. It reaches callers in two ways:
//!
//! - **synchronously**, from [`Task::perform`](crate::Task::perform), when the task's
//!   admission mode is not one of the supported modes;
//! - **through the settlement handle** ([`OperationFuture`](crate::OperationFuture)),
//!   when a routine or a future it yielded fails.
//!
//! Nothing is retried or recovered locally; retry policy belongs to the caller.
//! Like the runtime events, every variant has a stable [`as_label`](TaskError::as_label)
//! for logs/metrics.

use std::any::Any;

use thiserror::Error;

/// # Errors produced while admitting or stepping an operation.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TaskError {
    /// The task was configured with a mode outside `drop | restart | keepLatest | enqueue`.
    ///
    /// Reported at the first `perform` call; the call is not retried.
    #[error("cannot perform task in mode: {mode}")]
    UnsupportedMode {
        /// The offending mode name, as configured.
        mode: String,
    },

    /// The routine (or a future it yielded) failed.
    #[error("operation failed: {error}")]
    Failed {
        /// The underlying error message.
        error: String,
    },

    /// The routine (or a future it yielded) panicked.
    ///
    /// The panic is contained to the operation; the task moves on to its next one.
    #[error("operation panicked: {info}")]
    Panicked {
        /// The panic payload, when it was a string.
        info: String,
    },

    /// The operation was dropped before it settled.
    ///
    /// Happens when the owning task and every handle to a queued operation are
    /// dropped while a settlement handle is still being awaited.
    #[error("operation abandoned before settlement")]
    Abandoned,
}

impl TaskError {
    /// Shorthand for [`TaskError::Failed`].
    ///
    /// # Example
    /// ```
    /// use taskgen::TaskError;
    ///
    /// let err = TaskError::fail("boom");
    /// assert_eq!(err.to_string(), "operation failed: boom");
    /// ```
    pub fn fail(error: impl Into<String>) -> Self {
        TaskError::Failed {
            error: error.into(),
        }
    }

    /// Wraps a payload caught with `catch_unwind`.
    pub(crate) fn panicked(payload: Box<dyn Any + Send>) -> Self {
        TaskError::Panicked {
            info: panic_message(payload.as_ref()),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use taskgen::TaskError;
    ///
    /// let err = TaskError::UnsupportedMode { mode: "bogus".into() };
    /// assert_eq!(err.as_label(), "task_unsupported_mode");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            TaskError::UnsupportedMode { .. } => "task_unsupported_mode",
            TaskError::Failed { .. } => "operation_failed",
            TaskError::Panicked { .. } => "operation_panicked",
            TaskError::Abandoned => "operation_abandoned",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            TaskError::UnsupportedMode { mode } => format!("unsupported mode: {mode}"),
            TaskError::Failed { error } => format!("error: {error}"),
            TaskError::Panicked { info } => format!("panic: {info}"),
            TaskError::Abandoned => "abandoned".to_string(),
        }
    }
}

/// Text of a panic payload, or `"unknown panic"` for non-string payloads.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_mode_names_the_mode() {
        let err = TaskError::UnsupportedMode {
            mode: "bogus".into(),
        };
        assert!(err.to_string().contains("bogus"));
        assert_eq!(err.as_message(), "unsupported mode: bogus");
    }

    #[test]
    fn labels_are_stable() {
        assert_eq!(TaskError::fail("x").as_label(), "operation_failed");
        assert_eq!(TaskError::Abandoned.as_label(), "operation_abandoned");
    }

    #[test]
    fn panic_payloads_become_messages() {
        let err = TaskError::panicked(Box::new("kaboom"));
        assert_eq!(err.as_label(), "operation_panicked");
        assert_eq!(err.to_string(), "operation panicked: kaboom");

        assert_eq!(panic_message(&String::from("owned")), "owned");
        assert_eq!(panic_message(&17u8), "unknown panic");
    }
}
