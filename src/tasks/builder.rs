use std::sync::Arc;

use crate::config::Config;
use crate::core::Task;
use crate::events::Bus;
use crate::ids::IdProvider;
use crate::tasks::{Generator, Mode, ModeSetting};

/// Fluent construction of a [`Task`].
///
/// # Example
/// ```
/// use taskgen::{GeneratorFn, Mode, RoutineFn, Step, TaskBuilder, TaskError};
///
/// let echo = GeneratorFn::new(|_: &(), n: u32| {
///     RoutineFn::new(move |_input: Option<u32>| Ok::<_, TaskError>(Step::done(n)))
/// });
/// let task = TaskBuilder::new(echo, ())
///     .name("echo")
///     .mode(Mode::Enqueue)
///     .build();
/// assert_eq!(task.name(), "echo");
/// assert_eq!(task.mode(), Ok(Mode::Enqueue));
/// ```
pub struct TaskBuilder<G: Generator> {
    pub(crate) generator: G,
    pub(crate) context: Arc<G::Context>,
    pub(crate) name: Option<Arc<str>>,
    pub(crate) mode: Option<ModeSetting>,
    pub(crate) default_mode: Mode,
    pub(crate) task_ids: Option<IdProvider>,
    pub(crate) operation_ids: Option<IdProvider>,
    pub(crate) bus: Option<Bus>,
}

impl<G: Generator> TaskBuilder<G> {
    /// Creates a builder for a task running `generator` with `context`.
    pub fn new(generator: G, context: G::Context) -> Self {
        Self {
            generator,
            context: Arc::new(context),
            name: None,
            mode: None,
            default_mode: Mode::default(),
            task_ids: None,
            operation_ids: None,
            bus: None,
        }
    }

    /// Sets the task name used in events (default `task-<id>`).
    pub fn name(mut self, name: impl Into<Arc<str>>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Replaces the context.
    pub fn context(mut self, context: G::Context) -> Self {
        self.context = Arc::new(context);
        self
    }

    /// Shares an existing context with other tasks.
    pub fn shared_context(mut self, context: Arc<G::Context>) -> Self {
        self.context = context;
        self
    }

    /// Sets the admission mode. Takes precedence over [`with_config`](Self::with_config).
    pub fn mode(mut self, mode: Mode) -> Self {
        self.mode = Some(ModeSetting::Supported(mode));
        self
    }

    /// Sets the admission mode by name.
    ///
    /// An unknown name does not fail here; the task reports
    /// [`TaskError::UnsupportedMode`](crate::TaskError::UnsupportedMode) on every `perform`.
    pub fn mode_name(mut self, name: &str) -> Self {
        self.mode = Some(ModeSetting::from_name(name));
        self
    }

    /// Draws the task id from `ids` instead of the process-wide provider.
    pub fn task_ids(mut self, ids: IdProvider) -> Self {
        self.task_ids = Some(ids);
        self
    }

    /// Draws operation ids from `ids` instead of the process-wide provider.
    pub fn operation_ids(mut self, ids: IdProvider) -> Self {
        self.operation_ids = Some(ids);
        self
    }

    /// Publishes lifecycle events on `bus`.
    pub fn bus(mut self, bus: Bus) -> Self {
        self.bus = Some(bus);
        self
    }

    /// Applies crate-wide defaults.
    ///
    /// `cfg.default_mode` is used only when neither [`mode`](Self::mode) nor
    /// [`mode_name`](Self::mode_name) is called, in any order.
    pub fn with_config(mut self, cfg: &Config) -> Self {
        self.default_mode = cfg.default_mode;
        self
    }

    /// Builds the task. Publishes `TaskCreated` when a bus is set.
    pub fn build(self) -> Task<G> {
        Task::from_builder(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TaskError;
    use crate::events::EventKind;
    use crate::test_utils::{Harness, gated};

    #[test]
    fn default_name_uses_task_id() {
        let task = TaskBuilder::new(gated(), Harness::new())
            .task_ids(IdProvider::new())
            .build();
        assert_eq!(task.id(), 1);
        assert_eq!(task.name(), "task-1");
        assert_eq!(task.mode(), Ok(Mode::Drop));
    }

    #[test]
    fn unknown_mode_name_is_deferred() {
        let task = TaskBuilder::new(gated(), Harness::new())
            .mode_name("bogus")
            .build();
        assert_eq!(
            task.mode(),
            Err(TaskError::UnsupportedMode {
                mode: "bogus".into()
            })
        );
    }

    #[test]
    fn config_sets_default_mode() {
        let cfg = Config {
            default_mode: Mode::KeepLatest,
            ..Config::default()
        };
        let task = TaskBuilder::new(gated(), Harness::new())
            .with_config(&cfg)
            .build();
        assert_eq!(task.mode(), Ok(Mode::KeepLatest));
    }

    #[test]
    fn explicit_mode_wins_over_config() {
        let cfg = Config {
            default_mode: Mode::KeepLatest,
            ..Config::default()
        };

        let before = TaskBuilder::new(gated(), Harness::new())
            .mode(Mode::Enqueue)
            .with_config(&cfg)
            .build();
        assert_eq!(before.mode(), Ok(Mode::Enqueue));

        let after = TaskBuilder::new(gated(), Harness::new())
            .with_config(&cfg)
            .mode(Mode::Restart)
            .build();
        assert_eq!(after.mode(), Ok(Mode::Restart));

        let unknown = TaskBuilder::new(gated(), Harness::new())
            .mode_name("bogus")
            .with_config(&cfg)
            .build();
        assert!(unknown.mode().is_err());
    }

    #[tokio::test]
    async fn build_announces_task_on_bus() {
        let bus = Bus::new(8);
        let mut rx = bus.subscribe();
        let task = TaskBuilder::new(gated(), Harness::new())
            .name("announced")
            .mode(Mode::Restart)
            .bus(bus)
            .build();

        let ev = rx.recv().await.unwrap();
        assert_eq!(ev.kind, EventKind::TaskCreated);
        assert_eq!(ev.task_id, Some(task.id()));
        assert_eq!(ev.task.as_deref(), Some("announced"));
        assert_eq!(ev.mode, Some(Mode::Restart));
    }
}
