//! # Runtime events emitted by tasks and operations.
//!
//! The [`EventKind`] enum classifies event types across three categories:
//! - **Admission events**: what a `perform` call did (queued, started, dropped, rejected)
//! - **Settlement events**: how an operation finalized (completed, cancelled, failed)
//! - **Subscriber events**: delivery problems inside the subscriber set
//!
//! The [`Event`] struct carries additional metadata such as timestamps, task name,
//! ids and reasons.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//! Use `seq` to restore the exact order when events are delivered out of order.
//!
//! ## Example
//! ```rust
//! use taskgen::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::OperationFailed)
//!     .with_task("search")
//!     .with_task_id(1)
//!     .with_operation_id(7)
//!     .with_reason("boom");
//!
//! assert_eq!(ev.kind, EventKind::OperationFailed);
//! assert_eq!(ev.task.as_deref(), Some("search"));
//! assert_eq!(ev.operation_id, Some(7));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::SystemTime;

use crate::tasks::Mode;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Task events ===
    /// Task was constructed.
    ///
    /// Sets: `task`, `task_id`, `mode` (if supported)
    TaskCreated,

    /// `perform` hit a task whose mode is not supported.
    ///
    /// Sets: `task`, `task_id`, `reason` (names the unsupported mode)
    ModeRejected,

    // === Admission events ===
    /// Operation was created and appended to the task without being started.
    ///
    /// Sets: `task`, `task_id`, `operation_id`, `mode`
    OperationQueued,

    /// Operation began stepping.
    ///
    /// Sets: `task`, `task_id`, `operation_id`
    OperationStarted,

    /// `perform` was discarded because an operation is already in flight (`drop` mode).
    ///
    /// Sets: `task`, `task_id`, `operation_id` (the in-flight operation)
    OperationDropped,

    /// Cancellation was requested for an operation.
    ///
    /// Sets: `task`, `task_id`, `operation_id`
    CancelRequested,

    // === Settlement events ===
    /// Routine returned; operation settled with `Outcome::Completed`.
    ///
    /// Sets: `task`, `task_id`, `operation_id`
    OperationCompleted,

    /// Operation finalized through the cancellation short-circuit.
    ///
    /// Sets: `task`, `task_id`, `operation_id`
    OperationCancelled,

    /// Routine (or an awaited value) failed; operation settled with an error.
    ///
    /// Sets: `task`, `task_id`, `operation_id`, `reason`
    OperationFailed,

    // === Subscriber events ===
    /// Subscriber panicked during event processing.
    ///
    /// Sets: `task` (subscriber name), `reason` (panic info)
    SubscriberPanicked,

    /// Subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets: `task` (subscriber name), `reason` ("full" / "closed")
    SubscriberOverflow,
}

/// Runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Name of the task (or subscriber), if applicable.
    pub task: Option<Arc<str>>,
    /// Id of the task, if applicable.
    pub task_id: Option<u64>,
    /// Id of the operation, if applicable.
    pub operation_id: Option<u64>,
    /// Admission mode of the task, if applicable.
    pub mode: Option<Mode>,
    /// Human-readable reason (errors, rejected mode, overflow details).
    pub reason: Option<Arc<str>>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            task: None,
            task_id: None,
            operation_id: None,
            mode: None,
            reason: None,
        }
    }

    /// Attaches a task (or subscriber) name.
    #[inline]
    pub fn with_task(mut self, task: impl Into<Arc<str>>) -> Self {
        self.task = Some(task.into());
        self
    }

    /// Attaches a task id.
    #[inline]
    pub fn with_task_id(mut self, id: u64) -> Self {
        self.task_id = Some(id);
        self
    }

    /// Attaches an operation id.
    #[inline]
    pub fn with_operation_id(mut self, id: u64) -> Self {
        self.operation_id = Some(id);
        self
    }

    /// Attaches an admission mode.
    #[inline]
    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = Some(mode);
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_task(subscriber)
            .with_reason(reason)
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_task(subscriber)
            .with_reason(info)
    }

    /// True for events that describe the end of an operation.
    #[inline]
    pub fn is_settlement(&self) -> bool {
        matches!(
            self.kind,
            EventKind::OperationCompleted
                | EventKind::OperationCancelled
                | EventKind::OperationFailed
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_numbers_increase() {
        let a = Event::new(EventKind::TaskCreated);
        let b = Event::new(EventKind::TaskCreated);
        assert!(b.seq > a.seq);
    }

    #[test]
    fn settlement_kinds() {
        assert!(Event::new(EventKind::OperationCancelled).is_settlement());
        assert!(Event::new(EventKind::OperationFailed).is_settlement());
        assert!(!Event::new(EventKind::OperationStarted).is_settlement());
    }

    #[test]
    fn overflow_carries_subscriber_and_reason() {
        let ev = Event::subscriber_overflow("audit", "full");
        assert_eq!(ev.kind, EventKind::SubscriberOverflow);
        assert_eq!(ev.task.as_deref(), Some("audit"));
        assert_eq!(ev.reason.as_deref(), Some("full"));
    }
}
