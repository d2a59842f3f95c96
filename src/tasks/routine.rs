//! # Suspendable work.
//!
//! A [`Routine`] is the state machine behind one operation. The stepper calls
//! [`Routine::resume`] once per suspension point:
//!
//! ```text
//! resume(None)        ──► Yield(v1)  ── await v1, next tick ──►
//! resume(Some(v1'))   ──► Yield(v2)  ── await v2, next tick ──►
//! resume(Some(v2'))   ──► Done(r)    ──► operation settles with Completed(r)
//! ```
//!
//! The yielded [`Suspend`] is either a ready value or a future; futures are awaited
//! before the next `resume`, and their output is what `resume` receives.
//! Cancellation is observed by the stepper **between** calls, never inside one.

use futures::future::BoxFuture;

use crate::error::TaskError;

/// Boxed routine as produced by a [`Generator`](crate::Generator).
pub type BoxRoutine<T> = Box<dyn Routine<T>>;

/// Value handed back to the stepper at a suspension point.
pub enum Suspend<T> {
    /// Ready value; fed back on the next step.
    Value(T),
    /// Value to await first; its output is fed back on the next step.
    Future(BoxFuture<'static, Result<T, TaskError>>),
}

impl<T> std::fmt::Debug for Suspend<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Suspend::Value(_) => f.write_str("Suspend::Value(..)"),
            Suspend::Future(_) => f.write_str("Suspend::Future(..)"),
        }
    }
}

/// Result of advancing a routine by one suspension point.
#[derive(Debug)]
pub enum Step<T> {
    /// Routine suspended; resume after the value is available.
    Yield(Suspend<T>),
    /// Routine returned.
    Done(T),
}

impl<T> Step<T> {
    /// Suspends with a ready value.
    pub fn yield_value(value: T) -> Self {
        Step::Yield(Suspend::Value(value))
    }

    /// Suspends until `fut` resolves.
    pub fn yield_future<F>(fut: F) -> Self
    where
        F: Future<Output = Result<T, TaskError>> + Send + 'static,
    {
        Step::Yield(Suspend::Future(Box::pin(fut)))
    }

    /// Returns the final value.
    pub fn done(value: T) -> Self {
        Step::Done(value)
    }
}

/// # Suspendable, resumable unit of work.
///
/// `input` is `None` on the first call and `Some(value)` afterwards, where `value`
/// is what the previous [`Suspend`] resolved to. Returning `Err` settles the
/// operation with that error.
///
/// # Example
/// ```
/// use taskgen::{Routine, Step, TaskError};
///
/// /// Yields twice, then returns the sum of what it was fed.
/// struct Sum { steps: u32, total: u32 }
///
/// impl Routine<u32> for Sum {
///     fn resume(&mut self, input: Option<u32>) -> Result<Step<u32>, TaskError> {
///         self.total += input.unwrap_or(0);
///         self.steps += 1;
///         Ok(if self.steps <= 2 { Step::yield_value(self.steps) } else { Step::done(self.total) })
///     }
/// }
/// ```
pub trait Routine<T>: Send + 'static {
    /// Advances to the next suspension point.
    fn resume(&mut self, input: Option<T>) -> Result<Step<T>, TaskError>;
}

/// Closure-backed routine.
///
/// Wraps `FnMut(Option<T>) -> Result<Step<T>, TaskError>`; keep the state in the
/// closure captures.
///
/// ## Example
/// ```rust
/// use taskgen::{RoutineFn, Step, TaskError};
///
/// let mut left = 2;
/// let _countdown = RoutineFn::new(move |_input: Option<u32>| {
///     left -= 1;
///     Ok::<_, TaskError>(if left > 0 { Step::yield_value(left) } else { Step::done(0) })
/// });
/// ```
pub struct RoutineFn<F> {
    f: F,
}

impl<F> RoutineFn<F> {
    /// Creates a new closure-backed routine.
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<T, F> Routine<T> for RoutineFn<F>
where
    F: FnMut(Option<T>) -> Result<Step<T>, TaskError> + Send + 'static,
{
    fn resume(&mut self, input: Option<T>) -> Result<Step<T>, TaskError> {
        (self.f)(input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closure_routine_keeps_its_state() {
        let mut seen = Vec::new();
        let mut routine = RoutineFn::new(move |input: Option<u32>| {
            seen.push(input);
            Ok::<_, TaskError>(match seen.len() {
                1 => Step::yield_value(10),
                2 => Step::yield_value(20),
                _ => Step::done(seen.iter().flatten().sum::<u32>()),
            })
        });

        assert!(matches!(
            routine.resume(None),
            Ok(Step::Yield(Suspend::Value(10)))
        ));
        assert!(matches!(
            routine.resume(Some(10)),
            Ok(Step::Yield(Suspend::Value(20)))
        ));
        assert!(matches!(routine.resume(Some(20)), Ok(Step::Done(30))));
    }
}
