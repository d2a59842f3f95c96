//! # taskgen
//!
//! **Taskgen** runs cancellable, resumable units of work on Tokio and decides what
//! happens when the same work is requested again while it is still running.
//!
//! A [`Task`] wraps a [`Generator`]: a reusable function that, for every admitted
//! invocation, produces a fresh [`Routine`]. The routine is a state machine that
//! suspends on values or futures; each invocation's routine is driven by an
//! [`Operation`] one step per suspension point. Between steps the operation checks its
//! cancellation flag, so cancellation is cooperative and never tears a step apart.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   caller ── perform(args) ──► Task ──(admission mode)──┬─► new Operation ─► stepper
//!                                 │                      ├─► current Operation's settlement
//!                                 │                      └─► queued Operation (runs later)
//!                                 │
//!                                 ├─ operations: [op#1 running, op#2 queued, ...]
//!                                 └─ Bus (optional) ──► spawn_listener ──► SubscriberSet
//!                                                                           ┌───┴───┐
//!                                                                           ▼       ▼
//!                                                                       LogWriter  custom
//! ```
//!
//! ### Lifecycle of one operation
//! ```text
//! perform ─► step(None) ─► Yield(v) ─► [tick] ─► await v ─► step(Some(v')) ─► ... ─► Done(r)
//!                │                                                  │
//!                └─ cancelled? ─► Cancelled(last value) ◄───────────┘
//!
//! settle ─► remove from task ─► publish event ─► resolve OperationFuture ─► start next queued
//! ```
//!
//! ## Features
//! | Area              | Description                                                | Key types / traits                      |
//! |-------------------|------------------------------------------------------------|-----------------------------------------|
//! | **Work**          | Suspendable routines and the generators that create them.  | [`Routine`], [`RoutineFn`], [`Generator`], [`GeneratorFn`] |
//! | **Tasks**         | Admission modes, operation list, cancellation.             | [`Task`], [`TaskBuilder`], [`Mode`]     |
//! | **Operations**    | One invocation, its flags and its settlement.              | [`Operation`], [`OperationFuture`], [`Outcome`] |
//! | **Dispatch**      | Uniform perform/cancel over tasks and operations.          | [`Invocation`], [`Target`], [`perform`], [`cancel`] |
//! | **Subscriber API**| Hook into lifecycle events (logging, metrics, custom).      | [`Subscribe`], [`SubscriberSet`], [`Bus`] |
//! | **Errors**        | Typed admission and execution errors.                      | [`TaskError`]                           |
//! | **Configuration** | Shared defaults.                                           | [`Config`]                              |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogWriter`] _(demo/reference only)_.
//!
//! ## Example
//! ```rust
//! use taskgen::{GeneratorFn, Mode, Outcome, RoutineFn, Step, TaskBuilder, TaskError};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), TaskError> {
//!     // Doubles its argument after one asynchronous hop.
//!     let double = GeneratorFn::new(|_: &(), n: u64| {
//!         RoutineFn::new(move |input: Option<u64>| {
//!             Ok::<_, TaskError>(match input {
//!                 None => Step::yield_future(async move { Ok(n * 2) }),
//!                 Some(v) => Step::done(v),
//!             })
//!         })
//!     });
//!
//!     let task = TaskBuilder::new(double, ()).mode(Mode::Enqueue).build();
//!     let first = task.perform(1)?;
//!     task.perform(2)?; // queued behind the first one
//!
//!     assert_eq!(first.await?, Outcome::Completed(2));
//!     Ok(())
//! }
//! ```
mod config;
mod core;
mod error;
mod events;
mod ids;
mod subscribers;
mod tasks;

#[cfg(test)]
mod test_utils;

// ---- Public re-exports ----

pub use config::Config;
pub use crate::core::{
    Cancellation, Invocation, Operation, OperationFuture, Outcome, Settlement, Target, Task,
    cancel, cancel_task, create_task, is_running, perform,
};
pub use error::TaskError;
pub use events::{Bus, Event, EventKind};
pub use ids::IdProvider;
pub use subscribers::{Subscribe, SubscriberSet, spawn_listener};
pub use tasks::{
    BoxRoutine, Generator, GeneratorFn, Mode, Routine, RoutineFn, Step, Suspend, TaskBuilder,
};

// Optional: expose a simple built-in logger subscriber (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
