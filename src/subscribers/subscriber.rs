//! # Subscribe: handler for task and operation events.
//!
//! Implement [`Subscribe`] to observe what tasks do: which invocations were admitted,
//! dropped or queued, and how every operation settled. A [`SubscriberSet`](crate::SubscriberSet)
//! runs each subscriber on its own worker behind its own bounded queue, so a slow or
//! panicking subscriber never stalls a task.
//!
//! ## Example
//! ```rust
//! use async_trait::async_trait;
//! use taskgen::{Event, EventKind, Subscribe};
//!
//! /// Counts dropped invocations.
//! struct Dropped(std::sync::atomic::AtomicU64);
//!
//! #[async_trait]
//! impl Subscribe for Dropped {
//!     async fn on_event(&self, ev: &Event) {
//!         if ev.kind == EventKind::OperationDropped {
//!             self.0.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
//!         }
//!     }
//!
//!     fn name(&self) -> &'static str { "dropped" }
//! }
//! ```

use async_trait::async_trait;

use crate::events::Event;

/// Receiver of task and operation events.
///
/// Handlers run off the publishing path. Keep them non-blocking and keep errors
/// inside; a panic is caught and reported as `SubscriberPanicked`.
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Handles one event. Events arrive in publish order for a given subscriber.
    async fn on_event(&self, event: &Event);

    /// Name stamped on overflow and panic events about this subscriber.
    ///
    /// Defaults to the type name.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Queue size for this subscriber (at least 1). Default: 1024.
    fn queue_capacity(&self) -> usize {
        1024
    }
}
