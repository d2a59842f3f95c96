//! # LogWriter: simple event printer
//!
//! A minimal subscriber that prints incoming [`Event`]s to stdout.
//! Use it for test or demo.
//!
//! ## Example output
//! ```text
//! [created] task="search" id=1 mode=Some(Restart)
//! [started] task="search" op=1
//! [cancel] task="search" op=1
//! [queued] task="search" op=2
//! [cancelled] task="search" op=1
//! [completed] task="search" op=2
//! [failed] task="search" op=3 err="operation failed: boom"
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

/// One line describing `e`.
fn render(e: &Event) -> String {
    let task = e.task.as_deref().unwrap_or("unknown");
    let op = e.operation_id.unwrap_or_default();
    let reason = e.reason.as_deref().unwrap_or("unknown");
    match e.kind {
        EventKind::TaskCreated => format!(
            "[created] task={task:?} id={} mode={:?}",
            e.task_id.unwrap_or_default(),
            e.mode
        ),
        EventKind::ModeRejected => format!("[mode-rejected] task={task:?} reason={reason:?}"),
        EventKind::OperationQueued => format!("[queued] task={task:?} op={op}"),
        EventKind::OperationStarted => format!("[started] task={task:?} op={op}"),
        EventKind::OperationDropped => format!("[dropped] task={task:?} in_flight={op}"),
        EventKind::CancelRequested => format!("[cancel] task={task:?} op={op}"),
        EventKind::OperationCompleted => format!("[completed] task={task:?} op={op}"),
        EventKind::OperationCancelled => format!("[cancelled] task={task:?} op={op}"),
        EventKind::OperationFailed => format!("[failed] task={task:?} op={op} err={reason:?}"),
        EventKind::SubscriberOverflow => {
            format!("[subscriber-overflow] subscriber={task} reason={reason:?}")
        }
        EventKind::SubscriberPanicked => {
            format!("[subscriber-panicked] subscriber={task} info={reason}")
        }
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        println!("{}", render(e));
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::Mode;

    #[test]
    fn renders_creation_and_failure() {
        let created = Event::new(EventKind::TaskCreated)
            .with_task("search")
            .with_task_id(1)
            .with_mode(Mode::Restart);
        assert_eq!(
            render(&created),
            r#"[created] task="search" id=1 mode=Some(Restart)"#
        );

        let failed = Event::new(EventKind::OperationFailed)
            .with_task("search")
            .with_operation_id(3)
            .with_reason("operation failed: boom");
        assert_eq!(
            render(&failed),
            r#"[failed] task="search" op=3 err="operation failed: boom""#
        );
    }

    #[tokio::test]
    async fn writes_without_a_task_name() {
        let ev = Event::new(EventKind::OperationStarted).with_operation_id(7);
        assert_eq!(render(&ev), r#"[started] task="unknown" op=7"#);
        LogWriter::new().on_event(&ev).await;
    }
}
