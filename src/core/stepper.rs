//! # Stepper: drives one operation's routine to settlement.
//!
//! ## Flow
//! ```text
//! start()                              (synchronous, inside perform)
//!   ├─► running = true, publish OperationStarted
//!   └─► step(None)
//!         ├─ Settled  ─► finalize ─► finish
//!         └─ Suspended(s) ─► tokio::spawn(drive(s))
//!
//! drive(s)                             (on the runtime, one tick per boundary)
//!   loop {
//!     ├─► input = s is Value(v) ? v : s.await        (Err or panic ─► finalize(Err))
//!     └─► step(Some(input))
//!           ├─ Suspended(next) ─► yield_now, continue
//!           └─ Settled         ─► finalize, break
//!   }
//!   finish()
//!
//! step(input)
//!   ├─ cancelled ─► Settled(Cancelled(input))        (no resume)
//!   └─ routine.resume(input)
//!         ├─ Yield(s)  ─► Suspended(s)
//!         ├─ Done(v)   ─► Settled(Completed(v))
//!         ├─ Err(e)    ─► Settled(Err(e))
//!         └─ panic     ─► Settled(Err(Panicked))
//!
//! finalize(settlement)
//!   ├─► task.remove_operation(op)                    (idempotent)
//!   ├─► drop routine, take settler                   (once)
//!   └─► publish OperationCompleted/Cancelled/Failed, send settlement
//!
//! finish()
//!   ├─► running = false
//!   └─► task.run_next_operation()
//! ```
//!
//! ## Rules
//! - The first step runs in the caller's turn; every later step runs at least one
//!   scheduler tick after the previous one.
//! - Cancellation is checked at the start of each step only; an in-flight await is
//!   never pre-empted, and its output becomes the cancelled settlement value.
//! - No lock is held while the routine runs, so a routine may call back into its task.
//! - A panic in the routine or in an awaited future settles the operation with
//!   [`TaskError::Panicked`]; `finish` still runs and the task moves on.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::Ordering;

use futures::FutureExt;

use crate::core::lock;
use crate::core::operation::Operation;
use crate::core::outcome::{OperationFuture, Outcome, Settlement};
use crate::error::TaskError;
use crate::events::EventKind;
use crate::tasks::{Generator, Step, Suspend};

/// Result of one step.
pub(crate) enum Stepped<T> {
    /// Routine suspended on this value.
    Suspended(Suspend<T>),
    /// Operation must settle with this result.
    Settled(Settlement<T>),
}

impl<G: Generator> Operation<G> {
    /// Marks the operation running and takes its first step.
    ///
    /// Must be called from within a Tokio runtime when the routine suspends.
    pub(crate) fn start(&self) -> OperationFuture<G::Output> {
        if self.is_settled() {
            return self.promise();
        }
        if self
            .inner
            .running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return self.promise();
        }
        self.inner
            .origin
            .publish_op(EventKind::OperationStarted, self.inner.id);

        match self.step(None) {
            Stepped::Settled(settlement) => {
                self.finalize(settlement);
                self.finish();
            }
            Stepped::Suspended(pending) => {
                tokio::spawn(self.clone().drive(pending));
            }
        }
        self.promise()
    }

    /// Advances the routine by one suspension point.
    pub(crate) fn step(&self, input: Option<G::Output>) -> Stepped<G::Output> {
        if self.is_cancelled() {
            return Stepped::Settled(Ok(Outcome::Cancelled(input)));
        }

        let Some(mut routine) = lock(&self.inner.state).routine.take() else {
            return Stepped::Settled(Err(TaskError::Abandoned));
        };

        let resumed = catch_unwind(AssertUnwindSafe(|| routine.resume(input)));
        match resumed {
            Ok(Ok(Step::Yield(pending))) => {
                lock(&self.inner.state).routine = Some(routine);
                Stepped::Suspended(pending)
            }
            Ok(Ok(Step::Done(value))) => Stepped::Settled(Ok(Outcome::Completed(value))),
            Ok(Err(e)) => Stepped::Settled(Err(e)),
            Err(payload) => Stepped::Settled(Err(TaskError::panicked(payload))),
        }
    }

    /// Resolves suspension points and steps until the operation settles.
    async fn drive(self, mut pending: Suspend<G::Output>) {
        loop {
            let input = match pending {
                Suspend::Value(value) => value,
                Suspend::Future(fut) => match AssertUnwindSafe(fut).catch_unwind().await {
                    Ok(Ok(value)) => value,
                    Ok(Err(e)) => {
                        self.finalize(Err(e));
                        break;
                    }
                    Err(payload) => {
                        self.finalize(Err(TaskError::panicked(payload)));
                        break;
                    }
                },
            };

            match self.step(Some(input)) {
                Stepped::Suspended(next) => {
                    pending = next;
                    tokio::task::yield_now().await;
                }
                Stepped::Settled(settlement) => {
                    self.finalize(settlement);
                    break;
                }
            }
        }
        self.finish();
    }

    /// Finalizes a cancelled operation that is not being stepped.
    pub(crate) fn settle_cancelled(&self) {
        if let Stepped::Settled(settlement) = self.step(None) {
            self.finalize(settlement);
        }
    }

    /// Removes the operation from its task and settles it. Idempotent.
    pub(crate) fn finalize(&self, settlement: Settlement<G::Output>) {
        if let Some(task) = self.task() {
            task.remove_operation(self);
        }

        let settler = {
            let mut state = lock(&self.inner.state);
            state.routine = None;
            state.settler.take()
        };
        let Some(settler) = settler else {
            return;
        };

        let origin = &self.inner.origin;
        match &settlement {
            Ok(Outcome::Completed(_)) => {
                origin.publish_op(EventKind::OperationCompleted, self.inner.id)
            }
            Ok(Outcome::Cancelled(_)) => {
                origin.publish_op(EventKind::OperationCancelled, self.inner.id)
            }
            Err(e) => origin.publish(
                origin
                    .event(EventKind::OperationFailed)
                    .with_operation_id(self.inner.id)
                    .with_reason(e.to_string()),
            ),
        }
        let _ = settler.send(settlement);
    }

    /// Clears the running flag and hands the task to its next queued operation.
    fn finish(&self) {
        self.inner.running.store(false, Ordering::Release);
        if let Some(task) = self.task() {
            task.run_next_operation();
        }
    }
}
