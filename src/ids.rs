//! # Identifier generators for tasks and operations.
//!
//! [`IdProvider`] hands out monotonically increasing `u64` identifiers starting at 1.
//! Two process-wide providers back every task and operation by default; a builder can
//! inject its own provider instead (see [`TaskBuilder`](crate::TaskBuilder)), which
//! is how tests get predictable numbering.
//!
//! Overflow is not handled: a provider that reaches `u64::MAX` wraps.

use std::sync::{
    Arc, LazyLock,
    atomic::{AtomicU64, Ordering},
};

static TASK_IDS: LazyLock<IdProvider> = LazyLock::new(IdProvider::new);
static OPERATION_IDS: LazyLock<IdProvider> = LazyLock::new(IdProvider::new);

/// Shareable monotonically increasing id counter.
///
/// Cloning shares the counter.
///
/// # Example
/// ```
/// use taskgen::IdProvider;
///
/// let ids = IdProvider::new();
/// assert_eq!(ids.next_id(), 1);
/// assert_eq!(ids.clone().next_id(), 2);
/// ids.reset();
/// assert_eq!(ids.next_id(), 1);
/// ```
#[derive(Clone, Debug, Default)]
pub struct IdProvider {
    last: Arc<AtomicU64>,
}

impl IdProvider {
    /// Creates a provider whose first id is 1.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the process-wide provider used for task ids.
    pub fn tasks() -> Self {
        TASK_IDS.clone()
    }

    /// Returns the process-wide provider used for operation ids.
    pub fn operations() -> Self {
        OPERATION_IDS.clone()
    }

    /// Returns the next id.
    #[inline]
    pub fn next_id(&self) -> u64 {
        self.last.fetch_add(1, Ordering::Relaxed).wrapping_add(1)
    }

    /// Restarts numbering at 1.
    pub fn reset(&self) {
        self.last.store(0, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_one_and_increments() {
        let ids = IdProvider::new();
        assert_eq!(ids.next_id(), 1);
        assert_eq!(ids.next_id(), 2);
        assert_eq!(ids.next_id(), 3);
    }

    #[test]
    fn clones_share_the_counter() {
        let a = IdProvider::new();
        let b = a.clone();
        assert_eq!(a.next_id(), 1);
        assert_eq!(b.next_id(), 2);
    }

    #[test]
    fn process_wide_providers_are_shared() {
        let first = IdProvider::operations().next_id();
        let second = IdProvider::operations().next_id();
        assert!(second > first);
    }
}
