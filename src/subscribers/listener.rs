//! # Bus → subscriber bridge.
//!
//! [`spawn_listener`] subscribes to a [`Bus`] and forwards every event to a
//! [`SubscriberSet`] until the token is cancelled or the bus closes, then shuts the
//! set down so subscribers drain their queues.
//!
//! ```text
//! Bus.subscribe() ──► recv loop ──► SubscriberSet::emit(&Event)   (fire-and-forget)
//!                        │
//!                        └─ token cancelled / bus closed ──► SubscriberSet::shutdown()
//! ```

use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::events::{Bus, Event, EventKind};
use crate::subscribers::SubscriberSet;

/// Spawns the listener task. Must be called from within a Tokio runtime.
///
/// Lagging is reported on the bus as `SubscriberOverflow` with reason `"lagged"`.
pub fn spawn_listener(bus: &Bus, set: SubscriberSet, token: CancellationToken) -> JoinHandle<()> {
    let mut rx = bus.subscribe();
    let bus = bus.clone();

    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = token.cancelled() => break,
                msg = rx.recv() => match msg {
                    Ok(ev) => set.emit(&ev),
                    Err(RecvError::Closed) => break,
                    Err(RecvError::Lagged(_)) => {
                        bus.publish(
                            Event::new(EventKind::SubscriberOverflow)
                                .with_task("listener")
                                .with_reason("lagged"),
                        );
                    }
                }
            }
        }
        set.shutdown().await;
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subscribers::Subscribe;
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    struct Recorder {
        seen: Arc<Mutex<Vec<u64>>>,
    }

    #[async_trait]
    impl Subscribe for Recorder {
        async fn on_event(&self, ev: &Event) {
            if let Some(id) = ev.operation_id {
                self.seen.lock().unwrap().push(id);
            }
        }
    }

    #[tokio::test]
    async fn forwards_until_cancelled() {
        let bus = Bus::new(16);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let set = SubscriberSet::new(
            vec![Arc::new(Recorder { seen: seen.clone() })],
            bus.clone(),
        );
        let token = CancellationToken::new();
        let handle = spawn_listener(&bus, set, token.clone());

        bus.publish(Event::new(EventKind::OperationStarted).with_operation_id(1));
        bus.publish(Event::new(EventKind::OperationCompleted).with_operation_id(1));
        for _ in 0..8 {
            tokio::task::yield_now().await;
        }
        token.cancel();
        handle.await.expect("listener");

        assert_eq!(*seen.lock().unwrap(), vec![1, 1]);
    }
}
