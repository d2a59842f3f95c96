//! # Operation: one in-flight invocation of a task.
//!
//! An [`Operation`] is created by a task's admission policy for every admitted (or
//! queued) invocation. It owns the routine produced by the task's generator for that
//! invocation's arguments, a cancellation flag, a running flag, and its settlement.
//!
//! ## Lifecycle
//! ```text
//! created (queued) ──perform──► running ──routine Done──────► settled: Completed(v)
//!      │                          │  └──routine Err───────────► settled: Err(e)
//!      │                          └──cancel, next boundary────► settled: Cancelled(last)
//!      └──cancel──────────────────────────────────────────────► settled: Cancelled(None)
//! ```
//!
//! ## Rules
//! - An operation is removed from its task's list exactly when it settles.
//! - `perform` on a running or settled operation only returns its settlement.
//! - Cancellation is cooperative: it is observed at the next step boundary.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, Weak};

use tokio_util::sync::CancellationToken;

use crate::core::lock;
use crate::core::origin::Origin;
use crate::core::outcome::{OperationFuture, Settler};
use crate::core::task::{Task, TaskInner};
use crate::events::EventKind;
use crate::tasks::{BoxRoutine, Generator};

/// Handle to one invocation of a [`Task`]. Cheap to clone.
pub struct Operation<G: Generator> {
    pub(crate) inner: Arc<OperationInner<G>>,
}

pub(crate) struct OperationInner<G: Generator> {
    pub(crate) id: u64,
    pub(crate) task: Weak<TaskInner<G>>,
    pub(crate) origin: Arc<Origin>,
    pub(crate) context: Arc<G::Context>,
    pub(crate) running: AtomicBool,
    pub(crate) token: CancellationToken,
    pub(crate) state: Mutex<OperationState<G::Output>>,
    pub(crate) settlement: OperationFuture<G::Output>,
}

/// Parts that leave the operation as it steps and settles.
pub(crate) struct OperationState<T> {
    /// Taken out while the routine is being resumed; dropped at settlement.
    pub(crate) routine: Option<BoxRoutine<T>>,
    /// Taken exactly once, at settlement.
    pub(crate) settler: Option<Settler<T>>,
}

impl<G: Generator> Operation<G> {
    /// Creates an operation for `task`, invoking its generator with `args`.
    ///
    /// The operation is **not** added to the task; see [`Task::push_operation`].
    pub(crate) fn new(task: &Task<G>, args: G::Args) -> Self {
        let owner = &task.inner;
        let id = owner.operation_ids.next_id();
        let routine = owner.generator.call(&owner.context, args);
        let (settler, settlement) = OperationFuture::channel(id);

        Self {
            inner: Arc::new(OperationInner {
                id,
                task: Arc::downgrade(owner),
                origin: Arc::clone(&owner.origin),
                context: Arc::clone(&owner.context),
                running: AtomicBool::new(false),
                token: CancellationToken::new(),
                state: Mutex::new(OperationState {
                    routine: Some(routine),
                    settler: Some(settler),
                }),
                settlement,
            }),
        }
    }

    /// Unique operation id.
    pub fn id(&self) -> u64 {
        self.inner.id
    }

    /// Owning task, unless it has been dropped.
    pub fn task(&self) -> Option<Task<G>> {
        self.inner.task.upgrade().map(|inner| Task { inner })
    }

    /// Context the routine was created with.
    pub fn context(&self) -> &Arc<G::Context> {
        &self.inner.context
    }

    /// True while the operation is the one being stepped (set by `perform`,
    /// cleared when it finishes).
    pub fn is_running(&self) -> bool {
        self.inner.running.load(Ordering::Acquire)
    }

    /// True once cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.inner.token.is_cancelled()
    }

    /// True once the operation has settled.
    pub fn is_settled(&self) -> bool {
        lock(&self.inner.state).settler.is_none()
    }

    /// Settlement handle.
    pub fn promise(&self) -> OperationFuture<G::Output> {
        self.inner.settlement.clone()
    }

    /// Token that is cancelled when the operation is.
    ///
    /// Routines can hand it to the futures they yield, so those can stop early;
    /// the stepper itself never pre-empts an in-flight await.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.inner.token.clone()
    }

    /// Starts stepping the operation.
    ///
    /// No new arguments are accepted: they were bound when the operation was created.
    /// Returns the settlement handle; a no-op if the operation is already running or settled.
    pub fn perform(&self) -> OperationFuture<G::Output> {
        self.start()
    }

    /// Alias of [`perform`](Self::perform).
    pub fn run(&self) -> OperationFuture<G::Output> {
        self.perform()
    }

    /// Requests cancellation.
    ///
    /// - **not started**: finalized immediately with `Cancelled(None)`;
    /// - **running**: finalized at the next step boundary with the value fed in there;
    /// - **settled**: no-op; the returned handle is already resolved.
    pub fn cancel(&self) -> OperationFuture<G::Output> {
        if !self.inner.token.is_cancelled() {
            self.inner.token.cancel();
            self.inner
                .origin
                .publish_op(EventKind::CancelRequested, self.inner.id);
        }
        if !self.is_running() && !self.is_settled() {
            self.settle_cancelled();
        }
        self.promise()
    }

    /// True if both handles refer to the same operation.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<G: Generator> Clone for Operation<G> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<G: Generator> std::fmt::Debug for Operation<G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Operation")
            .field("id", &self.inner.id)
            .field("task", &self.inner.origin.name)
            .field("running", &self.is_running())
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}
