//! # Event bus for broadcasting task events.
//!
//! [`Bus`] is a thin wrapper around [`tokio::sync::broadcast`] that provides
//! non-blocking event publishing from every task built with it.
//!
//! ## Architecture
//! ```text
//! Publishers (many):                 Subscriber (one per listener):
//!   Task 1 ──┐
//!   Task 2 ──┼──────► Bus ───────► spawn_listener ────► SubscriberSet
//!   Task N ──┘  (broadcast chan)
//! ```
//!
//! ## Rules
//! - **Non-blocking publish**: `publish()` never blocks; it calls `broadcast::Sender::send`.
//! - **Bounded capacity**: a single ring buffer stores recent events for all receivers.
//! - **Lag handling**: slow receivers get `RecvError::Lagged(n)` and skip `n` oldest items.
//! - **No persistence**: events are lost if there are no active subscribers at send time.

use tokio::sync::broadcast;

use super::event::Event;
use crate::config::Config;

/// Broadcast channel for task events.
///
/// ### Properties
/// - **Non-blocking**: `publish()` returns immediately.
/// - **Fire-and-forget**: no delivery or durability guarantees.
/// - **Cloneable**: cheap to clone (internally holds an `Arc`-backed sender).
#[derive(Clone, Debug)]
pub struct Bus {
    tx: broadcast::Sender<Event>,
}

impl Bus {
    /// Creates a new bus with the given channel capacity.
    ///
    /// The minimum capacity is 1 (clamped).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (tx, _rx) = broadcast::channel::<Event>(capacity);
        Self { tx }
    }

    /// Creates a bus sized by `cfg.bus_capacity`.
    pub fn from_config(cfg: &Config) -> Self {
        Self::new(cfg.bus_capacity_clamped())
    }

    /// Publishes an event to all active subscribers.
    ///
    /// If there are no receivers, the event is dropped.
    pub fn publish(&self, ev: Event) {
        let _ = self.tx.send(ev);
    }

    /// Creates a new receiver that will observe subsequent events.
    ///
    /// A receiver only gets events **sent after** it subscribes.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventKind;

    #[tokio::test]
    async fn receivers_see_events_published_after_subscribing() {
        let bus = Bus::new(8);
        bus.publish(Event::new(EventKind::TaskCreated));

        let mut rx = bus.subscribe();
        bus.publish(Event::new(EventKind::OperationStarted).with_operation_id(3));

        let ev = rx.recv().await.expect("event");
        assert_eq!(ev.kind, EventKind::OperationStarted);
        assert_eq!(ev.operation_id, Some(3));
    }

    #[tokio::test]
    async fn config_capacity_bounds_the_ring_buffer() {
        let cfg = Config {
            bus_capacity: 2,
            ..Config::default()
        };
        let bus = Bus::from_config(&cfg);
        let mut rx = bus.subscribe();
        for id in 1..=3 {
            bus.publish(Event::new(EventKind::OperationStarted).with_operation_id(id));
        }

        assert!(matches!(
            rx.recv().await,
            Err(broadcast::error::RecvError::Lagged(1))
        ));
        let ev = rx.recv().await.expect("event");
        assert_eq!(ev.operation_id, Some(2));
    }

    #[test]
    fn publishing_without_receivers_is_fine() {
        let bus = Bus::new(0);
        bus.publish(Event::new(EventKind::TaskCreated));
    }
}
