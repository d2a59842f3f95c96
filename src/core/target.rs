//! # Uniform entry points over tasks and operations.
//!
//! Callers that hold "either a task or an operation" go through two closed enums:
//! - [`Invocation`] for `perform`: a task takes fresh arguments, an operation already
//!   has its arguments bound;
//! - [`Target`] for `cancel` and `is_running`.
//!
//! ```text
//! perform(Invocation::Task(t, args))  ──► t.perform(args)    (mode applies)
//! perform(Invocation::Operation(op))  ──► Ok(op.perform())
//! cancel(Target::Task(t))             ──► t.cancel()
//! cancel(Target::Operation(op))       ──► op.cancel(), settled value discarded
//! ```

use futures::FutureExt;

use crate::core::operation::Operation;
use crate::core::outcome::OperationFuture;
use crate::core::task::{Cancellation, Task};
use crate::error::TaskError;
use crate::tasks::{Generator, Mode, TaskBuilder};

/// Something that can be performed.
pub enum Invocation<'a, G: Generator> {
    /// Invoke a task with new arguments.
    Task(&'a Task<G>, G::Args),
    /// Start an already created operation.
    Operation(&'a Operation<G>),
}

/// Something that can be cancelled or queried.
pub enum Target<'a, G: Generator> {
    Task(&'a Task<G>),
    Operation(&'a Operation<G>),
}

impl<'a, G: Generator> From<&'a Task<G>> for Target<'a, G> {
    fn from(task: &'a Task<G>) -> Self {
        Target::Task(task)
    }
}

impl<'a, G: Generator> From<&'a Operation<G>> for Target<'a, G> {
    fn from(op: &'a Operation<G>) -> Self {
        Target::Operation(op)
    }
}

impl<'a, G: Generator> From<&'a Operation<G>> for Invocation<'a, G> {
    fn from(op: &'a Operation<G>) -> Self {
        Invocation::Operation(op)
    }
}

impl<G: Generator> Target<'_, G> {
    /// Requests cancellation; see [`cancel`].
    pub fn cancel(&self) -> Cancellation {
        match self {
            Target::Task(task) => task.cancel(),
            Target::Operation(op) => op.cancel().map(|_| ()).boxed(),
        }
    }

    /// True if the task has a current operation, or the operation is being stepped.
    pub fn is_running(&self) -> bool {
        match self {
            Target::Task(task) => task.is_running(),
            Target::Operation(op) => op.is_running(),
        }
    }
}

/// Performs a task or an operation.
///
/// ### Errors
/// [`TaskError::UnsupportedMode`] when a task was configured with an unknown mode.
pub fn perform<G: Generator>(
    invocation: Invocation<'_, G>,
) -> Result<OperationFuture<G::Output>, TaskError> {
    match invocation {
        Invocation::Task(task, args) => task.perform(args),
        Invocation::Operation(op) => Ok(op.perform()),
    }
}

/// Cancels a task (all of its operations) or a single operation.
///
/// The returned future resolves once everything cancelled has settled.
pub fn cancel<G: Generator>(target: Target<'_, G>) -> Cancellation {
    target.cancel()
}

/// True if the target is running.
pub fn is_running<G: Generator>(target: Target<'_, G>) -> bool {
    target.is_running()
}

/// Creates a task with `context` and an optional mode (default `Drop`).
pub fn create_task<G: Generator>(generator: G, context: G::Context, mode: Option<Mode>) -> Task<G> {
    TaskBuilder::new(generator, context)
        .mode(mode.unwrap_or_default())
        .build()
}

/// Cancels every operation of `task`.
pub fn cancel_task<G: Generator>(task: &Task<G>) -> Cancellation {
    task.cancel()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::outcome::Outcome;
    use crate::test_utils::{Harness, gated};

    #[tokio::test]
    async fn dispatches_to_task_and_operation() {
        let task = create_task(gated(), Harness::new(), None);
        let ctx = task.context().clone();

        let first = perform(Invocation::Task(&task, 1)).unwrap();
        assert!(is_running(Target::Task(&task)));

        let queued = task.create_operation(2);
        assert!(!is_running(Target::Operation(&queued)));
        let second = perform(Invocation::Operation(&queued)).unwrap();
        assert!(is_running(Target::Operation(&queued)));

        ctx.open(1, 10);
        ctx.open(2, 20);
        assert_eq!(first.await, Ok(Outcome::Completed(10)));
        assert_eq!(second.await, Ok(Outcome::Completed(20)));
    }

    #[tokio::test]
    async fn cancel_resolves_for_both_targets() {
        let task = create_task(gated(), Harness::new(), Some(Mode::Enqueue));
        let running = task.perform(1).unwrap();
        task.perform(2).unwrap();

        let queued = task.next_operation().unwrap();
        cancel(Target::Operation(&queued)).await;
        assert!(queued.is_settled());

        let all = cancel_task(&task);
        task.context().open(1, 5);
        all.await;
        assert_eq!(running.await, Ok(Outcome::Cancelled(Some(5))));
        assert!(!is_running(Target::Task(&task)));
    }
}
