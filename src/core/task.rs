//! # Task: reusable suspendable work plus an admission mode.
//!
//! A [`Task`] owns a [`Generator`], the context it is invoked with, and the ordered list
//! of its live [`Operation`]s (oldest first). [`Task::perform`] is the admission point:
//!
//! | Mode         | Idle                | Running                                               |
//! |--------------|---------------------|-------------------------------------------------------|
//! | `Drop`       | create + start      | return the current settlement; invocation discarded    |
//! | `Restart`    | create + start      | cancel all operations, then create + start            |
//! | `KeepLatest` | create + start      | queue one successor unless one is queued; return current |
//! | `Enqueue`    | create + start      | always queue; return current                          |
//!
//! "Idle" and "Running" are derived from the list: the task runs while some operation is
//! running and not cancelled. Queued operations start in list order when the current one
//! finishes.
//!
//! ## Rules
//! - The operation list is only mutated by push (admission) and removal (settlement).
//! - Every query works on a snapshot; no lock is held while an operation is started,
//!   cancelled or stepped.

use std::sync::{Arc, Mutex};

use futures::FutureExt;
use futures::future::{BoxFuture, join_all};

use crate::core::lock;
use crate::core::operation::Operation;
use crate::core::origin::Origin;
use crate::core::outcome::OperationFuture;
use crate::error::TaskError;
use crate::events::EventKind;
use crate::ids::IdProvider;
use crate::tasks::{Generator, Mode, ModeSetting, TaskBuilder};

/// Future returned by task-wide cancellation; resolves once every cancelled
/// operation has settled.
pub type Cancellation = BoxFuture<'static, ()>;

/// Handle to a task. Cheap to clone; clones share the operation list.
pub struct Task<G: Generator> {
    pub(crate) inner: Arc<TaskInner<G>>,
}

pub(crate) struct TaskInner<G: Generator> {
    pub(crate) origin: Arc<Origin>,
    pub(crate) generator: G,
    pub(crate) context: Arc<G::Context>,
    pub(crate) mode: ModeSetting,
    pub(crate) operations: Mutex<Vec<Operation<G>>>,
    pub(crate) operation_ids: IdProvider,
}

/// Running and not cancelled: eligible to be the task's current operation.
fn is_active<G: Generator>(op: &Operation<G>) -> bool {
    op.is_running() && !op.is_cancelled()
}

/// Not started and not cancelled: waiting for its turn.
fn is_pending<G: Generator>(op: &Operation<G>) -> bool {
    !op.is_running() && !op.is_cancelled()
}

impl<G: Generator> Task<G> {
    /// Starts building a task with a default context.
    pub fn builder(generator: G) -> TaskBuilder<G>
    where
        G::Context: Default,
    {
        TaskBuilder::new(generator, G::Context::default())
    }

    pub(crate) fn from_builder(builder: TaskBuilder<G>) -> Self {
        let task_id = builder
            .task_ids
            .unwrap_or_else(IdProvider::tasks)
            .next_id();
        let name = builder
            .name
            .unwrap_or_else(|| Arc::from(format!("task-{task_id}")));

        let origin = Arc::new(Origin {
            task_id,
            name,
            bus: builder.bus,
        });

        let mode = builder
            .mode
            .unwrap_or(ModeSetting::Supported(builder.default_mode));

        let mut created = origin.event(EventKind::TaskCreated);
        if let Some(mode) = mode.supported() {
            created = created.with_mode(mode);
        }
        origin.publish(created);

        Self {
            inner: Arc::new(TaskInner {
                origin,
                generator: builder.generator,
                context: builder.context,
                mode,
                operations: Mutex::new(Vec::new()),
                operation_ids: builder
                    .operation_ids
                    .unwrap_or_else(IdProvider::operations),
            }),
        }
    }

    /// Unique task id.
    pub fn id(&self) -> u64 {
        self.inner.origin.task_id
    }

    /// Task name (`task-<id>` unless set on the builder).
    pub fn name(&self) -> &str {
        &self.inner.origin.name
    }

    /// Context every routine of this task is invoked with.
    pub fn context(&self) -> &Arc<G::Context> {
        &self.inner.context
    }

    /// Admission mode, or the unsupported-mode error every `perform` reports.
    pub fn mode(&self) -> Result<Mode, TaskError> {
        self.inner.mode.resolve()
    }

    // ---------------------------
    // Admission
    // ---------------------------

    /// Invokes the task with `args` under its admission mode.
    ///
    /// Returns the settlement of the operation that answers this call: the new one when
    /// it starts immediately, otherwise the current one (see the module table).
    ///
    /// ### Errors
    /// [`TaskError::UnsupportedMode`] if the task was configured with an unknown mode name.
    ///
    /// ### Panics
    /// When the started routine suspends outside a Tokio runtime.
    pub fn perform(&self, args: G::Args) -> Result<OperationFuture<G::Output>, TaskError> {
        let mode = match self.mode() {
            Ok(mode) => mode,
            Err(e) => {
                let origin = &self.inner.origin;
                origin.publish(
                    origin
                        .event(EventKind::ModeRejected)
                        .with_reason(e.as_message()),
                );
                return Err(e);
            }
        };

        Ok(match mode {
            Mode::Drop => self.perform_in_mode_drop(args),
            Mode::Restart => self.perform_in_mode_restart(args),
            Mode::KeepLatest => self.perform_in_mode_keep_latest(args),
            Mode::Enqueue => self.perform_in_mode_enqueue(args),
        })
    }

    /// Alias of [`perform`](Self::perform).
    pub fn run(&self, args: G::Args) -> Result<OperationFuture<G::Output>, TaskError> {
        self.perform(args)
    }

    fn perform_in_mode_drop(&self, args: G::Args) -> OperationFuture<G::Output> {
        match self.current_operation() {
            None => self.enqueue_new_operation(args),
            Some(current) => {
                self.inner
                    .origin
                    .publish_op(EventKind::OperationDropped, current.id());
                current.promise()
            }
        }
    }

    fn perform_in_mode_restart(&self, args: G::Args) -> OperationFuture<G::Output> {
        if self.is_running() {
            for op in self.operations() {
                op.cancel();
            }
        }
        self.enqueue_new_operation(args)
    }

    fn perform_in_mode_keep_latest(&self, args: G::Args) -> OperationFuture<G::Output> {
        let Some(current) = self.current_operation() else {
            return self.enqueue_new_operation(args);
        };
        if !self.has_next_operation() {
            self.enqueue_next_operation(args);
        }
        current.promise()
    }

    fn perform_in_mode_enqueue(&self, args: G::Args) -> OperationFuture<G::Output> {
        let Some(current) = self.current_operation() else {
            return self.enqueue_new_operation(args);
        };
        self.enqueue_next_operation(args);
        current.promise()
    }

    // ---------------------------
    // Cancellation
    // ---------------------------

    /// Cancels every operation of the task.
    ///
    /// Queued operations settle immediately; running ones settle at their next step
    /// boundary. The returned future resolves once all of them have settled, and
    /// immediately when there is nothing to cancel.
    pub fn cancel(&self) -> Cancellation {
        let pending: Vec<_> = self.operations().iter().map(Operation::cancel).collect();
        join_all(pending).map(|_| ()).boxed()
    }

    // ---------------------------
    // Introspection
    // ---------------------------

    /// Snapshot of the operation list, oldest first.
    pub fn operations(&self) -> Vec<Operation<G>> {
        lock(&self.inner.operations).clone()
    }

    /// True while some operation is running and not cancelled.
    pub fn is_running(&self) -> bool {
        lock(&self.inner.operations).iter().any(is_active)
    }

    /// Operations that are being stepped, including cancelled ones still draining.
    pub fn running_operations(&self) -> Vec<Operation<G>> {
        lock(&self.inner.operations)
            .iter()
            .filter(|op| op.is_running())
            .cloned()
            .collect()
    }

    /// The task's current unit of work: the first running, non-cancelled operation.
    pub fn current_operation(&self) -> Option<Operation<G>> {
        lock(&self.inner.operations)
            .iter()
            .find(|op| is_active(op))
            .cloned()
    }

    /// First queued operation (not running, not cancelled).
    pub fn next_operation(&self) -> Option<Operation<G>> {
        lock(&self.inner.operations)
            .iter()
            .find(|op| is_pending(op))
            .cloned()
    }

    /// True if an operation is queued.
    pub fn has_next_operation(&self) -> bool {
        lock(&self.inner.operations).iter().any(is_pending)
    }

    // ---------------------------
    // Operation list plumbing
    // ---------------------------

    /// Starts the first queued operation, if any.
    pub fn run_next_operation(&self) -> Option<OperationFuture<G::Output>> {
        let next = self.next_operation()?;
        Some(next.perform())
    }

    /// Creates an operation for `args` without adding it to the task.
    pub fn create_operation(&self, args: G::Args) -> Operation<G> {
        Operation::new(self, args)
    }

    /// Creates an operation, appends it, and starts it immediately.
    pub fn enqueue_new_operation(&self, args: G::Args) -> OperationFuture<G::Output> {
        self.enqueue_next_operation(args).perform()
    }

    /// Creates an operation and appends it without starting it.
    ///
    /// It starts once the operations before it have finished.
    pub fn enqueue_next_operation(&self, args: G::Args) -> Operation<G> {
        let op = self.push_operation(self.create_operation(args));
        let origin = &self.inner.origin;
        let mut queued = origin
            .event(EventKind::OperationQueued)
            .with_operation_id(op.id());
        if let Some(mode) = self.inner.mode.supported() {
            queued = queued.with_mode(mode);
        }
        origin.publish(queued);
        op
    }

    /// Appends `op` to the operation list and returns it.
    pub fn push_operation(&self, op: Operation<G>) -> Operation<G> {
        lock(&self.inner.operations).push(op.clone());
        op
    }

    /// Removes `op` from the operation list. Returns `false` if it was not there.
    pub fn remove_operation(&self, op: &Operation<G>) -> bool {
        let mut operations = lock(&self.inner.operations);
        let before = operations.len();
        operations.retain(|o| o.id() != op.id());
        operations.len() != before
    }

    /// True if both handles refer to the same task.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<G: Generator> Clone for Task<G> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<G: Generator> std::fmt::Debug for Task<G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Task")
            .field("id", &self.id())
            .field("name", &self.name())
            .field("mode", &self.inner.mode)
            .field("operations", &lock(&self.inner.operations).len())
            .finish()
    }
}
