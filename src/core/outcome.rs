//! # Operation settlement.
//!
//! Every operation settles exactly once, with one of:
//! - `Ok(Outcome::Completed(v))`: the routine returned `v`;
//! - `Ok(Outcome::Cancelled(last))`: the cancellation short-circuit fired; `last` is
//!   the value that was being fed in at that boundary (`None` before the first resume);
//! - `Err(TaskError)`: the routine or an awaited value failed.
//!
//! [`OperationFuture`] is the cloneable handle callers await for that settlement.
//! All handles of one operation share a single underlying future, so
//! [`OperationFuture::ptr_eq`] tells whether two `perform` calls were answered by the
//! same operation.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use tokio::sync::oneshot;

use crate::error::TaskError;

/// How an operation ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome<T> {
    /// The routine returned this value.
    Completed(T),
    /// The operation was cancelled; carries the in-flight value, if any.
    Cancelled(Option<T>),
}

impl<T> Outcome<T> {
    /// True for [`Outcome::Cancelled`].
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Outcome::Cancelled(_))
    }

    /// Borrows the settled value, if any.
    pub fn value(&self) -> Option<&T> {
        match self {
            Outcome::Completed(v) => Some(v),
            Outcome::Cancelled(v) => v.as_ref(),
        }
    }

    /// Consumes the outcome, returning the settled value, if any.
    pub fn into_value(self) -> Option<T> {
        match self {
            Outcome::Completed(v) => Some(v),
            Outcome::Cancelled(v) => v,
        }
    }
}

/// Final result of an operation.
pub type Settlement<T> = Result<Outcome<T>, TaskError>;

/// Sending half, owned by the operation until it settles.
pub(crate) type Settler<T> = oneshot::Sender<Settlement<T>>;

/// Awaitable, cloneable settlement of one operation.
pub struct OperationFuture<T> {
    operation_id: u64,
    inner: Shared<BoxFuture<'static, Settlement<T>>>,
}

impl<T> OperationFuture<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Creates a settlement pair for a new operation.
    pub(crate) fn channel(operation_id: u64) -> (Settler<T>, Self) {
        let (tx, rx) = oneshot::channel::<Settlement<T>>();
        let inner = rx
            .map(|res| res.unwrap_or(Err(TaskError::Abandoned)))
            .boxed()
            .shared();
        (tx, Self { operation_id, inner })
    }

    /// Id of the operation this handle settles with.
    pub fn operation_id(&self) -> u64 {
        self.operation_id
    }

    /// True if both handles await the same operation.
    ///
    /// Compares the shared future while both are pending and falls back to the
    /// operation id once either has been polled to completion.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Shared::ptr_eq(&self.inner, &other.inner) || self.operation_id == other.operation_id
    }

    /// Returns the settlement if it is already available.
    pub fn peek(&self) -> Option<&Settlement<T>> {
        self.inner.peek()
    }
}

impl<T> Clone for OperationFuture<T> {
    fn clone(&self) -> Self {
        Self {
            operation_id: self.operation_id,
            inner: self.inner.clone(),
        }
    }
}

impl<T> std::fmt::Debug for OperationFuture<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OperationFuture")
            .field("operation_id", &self.operation_id)
            .finish_non_exhaustive()
    }
}

impl<T> Future for OperationFuture<T>
where
    T: Clone + Send + Sync + 'static,
{
    type Output = Settlement<T>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.inner).poll(cx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn clones_settle_with_the_same_value() {
        let (tx, fut) = OperationFuture::<u32>::channel(7);
        let other = fut.clone();
        assert!(fut.ptr_eq(&other));
        assert!(fut.peek().is_none());

        tx.send(Ok(Outcome::Completed(42))).unwrap();
        assert_eq!(fut.await, Ok(Outcome::Completed(42)));
        assert_eq!(other.await, Ok(Outcome::Completed(42)));
    }

    #[tokio::test]
    async fn dropped_settler_reports_abandoned() {
        let (tx, fut) = OperationFuture::<u32>::channel(1);
        drop(tx);
        assert_eq!(fut.await, Err(TaskError::Abandoned));
    }

    #[test]
    fn cancelled_outcome_keeps_in_flight_value() {
        let outcome = Outcome::Cancelled(Some(5));
        assert!(outcome.is_cancelled());
        assert_eq!(outcome.value(), Some(&5));
        assert_eq!(Outcome::<u32>::Cancelled(None).into_value(), None);
    }
}
