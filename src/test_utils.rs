//! Gated routines for driving operations step by step in tests.
//!
//! A [`Harness`] is the task context. Routines built by [`gated`] park on a gate keyed
//! by their argument until the test opens it, and record what they see in a shared log.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use futures::FutureExt;
use futures::future::{BoxFuture, ready};
use tokio::sync::oneshot;

use crate::core::lock;
use crate::error::TaskError;
use crate::tasks::{Generator, GeneratorFn, RoutineFn, Step};

type Gated = Result<u32, TaskError>;

enum Gate {
    Waiting(oneshot::Sender<Gated>),
    Open(Gated),
}

#[derive(Default)]
struct HarnessInner {
    gates: Mutex<HashMap<u32, Gate>>,
    log: Mutex<Vec<String>>,
}

/// Test context: keyed gates plus a log of routine activity.
#[derive(Clone, Default)]
pub(crate) struct Harness {
    inner: Arc<HarnessInner>,
}

impl Harness {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Future that resolves once gate `key` is opened or failed.
    pub(crate) fn wait(&self, key: u32) -> BoxFuture<'static, Gated> {
        let mut gates = lock(&self.inner.gates);
        if let Some(Gate::Open(res)) = gates.remove(&key) {
            return ready(res).boxed();
        }
        let (tx, rx) = oneshot::channel();
        gates.insert(key, Gate::Waiting(tx));
        rx.map(|res| res.unwrap_or_else(|_| Err(TaskError::fail("gate dropped"))))
            .boxed()
    }

    /// Resolves gate `key` with `value`.
    pub(crate) fn open(&self, key: u32, value: u32) {
        self.resolve(key, Ok(value));
    }

    /// Resolves gate `key` with an error.
    pub(crate) fn fail(&self, key: u32, error: &str) {
        self.resolve(key, Err(TaskError::fail(error)));
    }

    fn resolve(&self, key: u32, res: Gated) {
        let mut gates = lock(&self.inner.gates);
        match gates.remove(&key) {
            Some(Gate::Waiting(tx)) => {
                let _ = tx.send(res);
            }
            _ => {
                gates.insert(key, Gate::Open(res));
            }
        }
    }

    pub(crate) fn record(&self, entry: impl Into<String>) {
        lock(&self.inner.log).push(entry.into());
    }

    pub(crate) fn log(&self) -> Vec<String> {
        lock(&self.inner.log).clone()
    }
}

/// One suspension: logs `start <key>`, waits on gate `key`, logs `resume <key> <v>`,
/// returns `v`.
pub(crate) fn gated() -> impl Generator<Context = Harness, Args = u32, Output = u32> {
    GeneratorFn::new(|h: &Harness, key: u32| {
        let h = h.clone();
        RoutineFn::new(move |input: Option<u32>| {
            Ok::<_, TaskError>(match input {
                None => {
                    h.record(format!("start {key}"));
                    Step::yield_future(h.wait(key))
                }
                Some(v) => {
                    h.record(format!("resume {key} {v}"));
                    Step::done(v)
                }
            })
        })
    })
}

/// Yields `1..=n` as ready values, then returns their sum. Logs every step.
pub(crate) fn counting() -> impl Generator<Context = Harness, Args = u32, Output = u32> {
    GeneratorFn::new(|h: &Harness, n: u32| {
        let h = h.clone();
        let mut yielded = 0;
        let mut total = 0;
        RoutineFn::new(move |input: Option<u32>| {
            h.record(format!("step {input:?}"));
            total += input.unwrap_or(0);
            Ok::<_, TaskError>(if yielded < n {
                yielded += 1;
                Step::yield_value(yielded)
            } else {
                Step::done(total)
            })
        })
    })
}
