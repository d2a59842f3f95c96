//! Runtime core: tasks, operations and the stepper that drives them.
//!
//! Internal modules:
//! - [`task`]: admission modes and the ordered operation list;
//! - [`operation`]: one invocation, its flags and its settlement;
//! - [`stepper`]: resumes a routine across suspension points until it settles;
//! - [`outcome`]: settlement values and the shared settlement handle;
//! - [`target`]: uniform `perform`/`cancel` over tasks and operations;
//! - `origin`: task identity shared with operations for event stamping.

use std::sync::{Mutex, MutexGuard, PoisonError};

mod operation;
mod origin;
mod outcome;
mod stepper;
mod target;
mod task;


pub use operation::Operation;
pub use outcome::{OperationFuture, Outcome, Settlement};
pub use target::{Invocation, Target, cancel, cancel_task, create_task, is_running, perform};
pub use task::{Cancellation, Task};

/// Locks `m`, recovering the guard if a previous holder panicked.
///
/// Routines run outside every lock, so a poisoned mutex only means a panic
/// elsewhere; the guarded data is still consistent.
pub(crate) fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}
