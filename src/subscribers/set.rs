//! # SubscriberSet: per-subscriber lanes for task events.
//!
//! Each subscriber gets a bounded lane and a worker draining it, so publishing never
//! waits on a handler.
//!
//! ## Architecture
//! ```text
//! emit(event) ─┬─► lane "log"     ─► deliver ─► LogWriter::on_event
//!              └─► lane "metrics" ─► deliver ─► Metrics::on_event
//!                   (try_send)          └─ panic ─► Bus: SubscriberPanicked
//! ```
//!
//! ## Rules
//! - Events keep their order within a lane; lanes are not ordered against each other.
//! - A full lane loses the event for that subscriber only and reports `SubscriberOverflow`.
//! - A panicking handler is caught with `AssertUnwindSafe`; state it shares behind a
//!   lock may be left half-updated.

use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::mpsc::{self, Receiver, Sender, error::TrySendError};
use tokio::task::JoinHandle;

use crate::error::panic_message;
use crate::events::{Bus, Event, EventKind};
use crate::subscribers::Subscribe;

/// Queue feeding one subscriber's worker.
struct Lane {
    subscriber: &'static str,
    queue: Sender<Arc<Event>>,
}

/// Fans task events out to subscribers, one worker per subscriber.
pub struct SubscriberSet {
    lanes: Vec<Lane>,
    workers: Vec<JoinHandle<()>>,
    bus: Bus,
}

impl SubscriberSet {
    /// Spawns a worker for every subscriber in `subs`.
    ///
    /// Overflow and panic reports go to `bus`. Must be called from within a Tokio runtime.
    #[must_use]
    pub fn new(subs: Vec<Arc<dyn Subscribe>>, bus: Bus) -> Self {
        let (lanes, workers): (Vec<_>, Vec<_>) = subs
            .into_iter()
            .map(|sub| {
                let (queue, events) = mpsc::channel(sub.queue_capacity().max(1));
                let lane = Lane {
                    subscriber: sub.name(),
                    queue,
                };
                (lane, tokio::spawn(deliver(sub, events, bus.clone())))
            })
            .unzip();
        Self {
            lanes,
            workers,
            bus,
        }
    }

    /// Queues a copy of `event` for every subscriber.
    pub fn emit(&self, event: &Event) {
        self.emit_arc(Arc::new(event.clone()));
    }

    /// Queues `event` for every subscriber without copying it.
    ///
    /// A full or closed lane drops the event for that subscriber and publishes
    /// `SubscriberOverflow`, unless the event is itself an overflow report.
    pub fn emit_arc(&self, event: Arc<Event>) {
        let report = event.kind != EventKind::SubscriberOverflow;
        for lane in &self.lanes {
            let reason = match lane.queue.try_send(Arc::clone(&event)) {
                Ok(()) => continue,
                Err(TrySendError::Full(_)) => "full",
                Err(TrySendError::Closed(_)) => "closed",
            };
            if report {
                self.bus
                    .publish(Event::subscriber_overflow(lane.subscriber, reason));
            }
        }
    }

    /// Number of subscribers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lanes.len()
    }

    /// True if there are no subscribers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lanes.is_empty()
    }

    /// Closes every lane and waits until each worker has handled what was queued.
    pub async fn shutdown(self) {
        drop(self.lanes);
        for worker in self.workers {
            let _ = worker.await;
        }
    }
}

/// Worker loop: hands queued events to `sub` until its lane closes.
async fn deliver(sub: Arc<dyn Subscribe>, mut events: Receiver<Arc<Event>>, bus: Bus) {
    while let Some(event) = events.recv().await {
        let handled = std::panic::AssertUnwindSafe(sub.on_event(&event))
            .catch_unwind()
            .await;
        if let Err(payload) = handled {
            bus.publish(Event::subscriber_panicked(
                sub.name(),
                panic_message(payload.as_ref()),
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct Recorder {
        seen: Arc<Mutex<Vec<EventKind>>>,
    }

    #[async_trait]
    impl Subscribe for Recorder {
        async fn on_event(&self, ev: &Event) {
            self.seen.lock().unwrap().push(ev.kind);
        }

        fn name(&self) -> &'static str {
            "recorder"
        }
    }

    struct Panicker;

    #[async_trait]
    impl Subscribe for Panicker {
        async fn on_event(&self, _ev: &Event) {
            panic!("subscriber exploded");
        }

        fn name(&self) -> &'static str {
            "panicker"
        }
    }

    #[tokio::test]
    async fn delivers_in_order_and_drains_on_shutdown() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let set = SubscriberSet::new(
            vec![Arc::new(Recorder { seen: seen.clone() })],
            Bus::new(8),
        );
        assert_eq!(set.len(), 1);

        set.emit(&Event::new(EventKind::OperationStarted));
        set.emit(&Event::new(EventKind::OperationCompleted));
        set.shutdown().await;

        assert_eq!(
            *seen.lock().unwrap(),
            vec![EventKind::OperationStarted, EventKind::OperationCompleted]
        );
    }

    struct Stalled(tokio::sync::Notify);

    #[async_trait]
    impl Subscribe for Stalled {
        async fn on_event(&self, _ev: &Event) {
            self.0.notified().await;
        }

        fn name(&self) -> &'static str {
            "stalled"
        }

        fn queue_capacity(&self) -> usize {
            1
        }
    }

    #[tokio::test]
    async fn full_lane_reports_overflow() {
        let bus = Bus::new(8);
        let mut rx = bus.subscribe();
        let stalled = Arc::new(Stalled(tokio::sync::Notify::new()));
        let set = SubscriberSet::new(vec![stalled.clone() as Arc<dyn Subscribe>], bus);

        // The worker has not run yet, so the single slot is taken by the first event.
        set.emit(&Event::new(EventKind::OperationStarted));
        set.emit(&Event::new(EventKind::OperationCompleted));

        let ev = rx.recv().await.expect("overflow event");
        assert_eq!(ev.kind, EventKind::SubscriberOverflow);
        assert_eq!(ev.task.as_deref(), Some("stalled"));
        assert_eq!(ev.reason.as_deref(), Some("full"));

        stalled.0.notify_one();
        set.shutdown().await;
    }

    #[tokio::test]
    async fn panics_are_reported_on_the_bus() {
        let bus = Bus::new(8);
        let mut rx = bus.subscribe();
        let set = SubscriberSet::new(vec![Arc::new(Panicker)], bus);

        set.emit(&Event::new(EventKind::TaskCreated));
        set.shutdown().await;

        let ev = rx.recv().await.expect("panic event");
        assert_eq!(ev.kind, EventKind::SubscriberPanicked);
        assert_eq!(ev.task.as_deref(), Some("panicker"));
        assert_eq!(ev.reason.as_deref(), Some("subscriber exploded"));
    }
}
