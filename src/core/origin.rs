use std::sync::Arc;

use crate::events::{Bus, Event, EventKind};

/// Identity of a task as stamped on its events.
///
/// Shared by the task and every operation it creates, so an operation still
/// reports correctly after its task is dropped.
#[derive(Debug)]
pub(crate) struct Origin {
    pub(crate) task_id: u64,
    pub(crate) name: Arc<str>,
    pub(crate) bus: Option<Bus>,
}

impl Origin {
    /// Builds an event of `kind` stamped with the task name and id.
    pub(crate) fn event(&self, kind: EventKind) -> Event {
        Event::new(kind)
            .with_task(Arc::clone(&self.name))
            .with_task_id(self.task_id)
    }

    /// Publishes on the task bus; no-op for tasks built without one.
    pub(crate) fn publish(&self, ev: Event) {
        if let Some(bus) = &self.bus {
            bus.publish(ev);
        }
    }

    /// Publishes an operation-scoped event.
    pub(crate) fn publish_op(&self, kind: EventKind, operation_id: u64) {
        if self.bus.is_some() {
            self.publish(self.event(kind).with_operation_id(operation_id));
        }
    }
}
