//! # Work function abstraction and closure-backed implementation.
//!
//! A [`Generator`] is the reusable part of a task: every admitted invocation calls it
//! with the task's context and the invocation arguments, and gets back a **fresh**
//! [`Routine`](crate::Routine) that the new operation owns.
//!
//! [`GeneratorFn`] wraps a closure `Fn(&C, A) -> R` where `R: Routine<T>`.
//! No shared mutable state between operations; if you need it, put an `Arc<...>`
//! in the context explicitly.
//!
//! ## Example
//! ```rust
//! use taskgen::{GeneratorFn, RoutineFn, Step, TaskError};
//!
//! // Context: a base offset. Args: the number to add.
//! let add = GeneratorFn::new(|base: &u64, n: u64| {
//!     let total = *base + n;
//!     RoutineFn::new(move |_input: Option<u64>| Ok::<_, TaskError>(Step::done(total)))
//! });
//! # let _ = add;
//! ```

use std::marker::PhantomData;

use crate::tasks::routine::{BoxRoutine, Routine};

/// # Suspendable work function.
///
/// - `Context`: value the function is invoked with (use `()` for none)
/// - `Args`: per-invocation arguments, supplied to `perform`
/// - `Output`: value type flowing through suspension points and returned at the end
pub trait Generator: Send + Sync + 'static {
    /// Environment shared by every operation of the task.
    type Context: Send + Sync + 'static;
    /// Arguments of one invocation.
    type Args: Send + 'static;
    /// Values yielded, resumed with, and returned.
    type Output: Clone + Send + Sync + 'static;

    /// Starts a new routine for one invocation.
    fn call(&self, context: &Self::Context, args: Self::Args) -> BoxRoutine<Self::Output>;
}

/// Function-backed generator.
///
/// Wraps a closure that *creates* a new routine per invocation.
pub struct GeneratorFn<C, A, T, F> {
    f: F,
    _marker: PhantomData<fn(&C, A) -> T>,
}

impl<C, A, T, F> GeneratorFn<C, A, T, F> {
    /// Creates a new function-backed generator.
    pub fn new<R>(f: F) -> Self
    where
        F: Fn(&C, A) -> R,
        R: Routine<T>,
    {
        Self {
            f,
            _marker: PhantomData,
        }
    }
}

impl<C, A, T, F, R> Generator for GeneratorFn<C, A, T, F>
where
    C: Send + Sync + 'static,
    A: Send + 'static,
    T: Clone + Send + Sync + 'static,
    F: Fn(&C, A) -> R + Send + Sync + 'static,
    R: Routine<T>,
{
    type Context = C;
    type Args = A;
    type Output = T;

    fn call(&self, context: &C, args: A) -> BoxRoutine<T> {
        Box::new((self.f)(context, args))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TaskError;
    use crate::tasks::routine::Step;
    use crate::tasks::RoutineFn;

    #[test]
    fn each_call_gets_a_fresh_routine() {
        let generator = GeneratorFn::new(|base: &u32, n: u32| {
            let total = *base + n;
            RoutineFn::new(move |_input: Option<u32>| Ok::<_, TaskError>(Step::done(total)))
        });

        let mut first = generator.call(&10, 1);
        let mut second = generator.call(&10, 2);
        assert!(matches!(first.resume(None), Ok(Step::Done(11))));
        assert!(matches!(second.resume(None), Ok(Step::Done(12))));
    }
}
