//! # Example: type-ahead search
//!
//! Every keystroke performs the `search` task in `Restart` mode: the lookup for the
//! previous prefix is cancelled at its next step and only the latest one completes.
//!
//! Run with `cargo run --example search` (add `--features logging` for the built-in
//! event printer).

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use taskgen::{
    Bus, Config, Event, GeneratorFn, Mode, Outcome, RoutineFn, Step, Subscribe,
    SubscriberSet, TaskBuilder, TaskError, spawn_listener,
};

/// Prints only how operations ended.
struct Settlements;

#[async_trait]
impl Subscribe for Settlements {
    async fn on_event(&self, e: &Event) {
        if e.is_settlement() {
            println!(
                "[settled] op={:?} kind={:?}",
                e.operation_id.unwrap_or_default(),
                e.kind
            );
        }
    }

    fn name(&self) -> &'static str {
        "settlements"
    }
}

const WORDS: &[&str] = &["rust", "rustc", "rustup", "ruby", "runtime", "tokio"];

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let bus = Bus::from_config(&Config::default());

    #[allow(unused_mut)]
    let mut subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(Settlements)];
    #[cfg(feature = "logging")]
    subs.push(Arc::new(taskgen::LogWriter::new()));

    let token = CancellationToken::new();
    let listener = spawn_listener(&bus, SubscriberSet::new(subs, bus.clone()), token.clone());

    // Two suspension points: a simulated index lookup, then a ranking pass.
    let search = GeneratorFn::new(|_: &(), prefix: String| {
        let mut stage = 0;
        RoutineFn::new(move |input: Option<Vec<String>>| {
            stage += 1;
            let prefix = prefix.clone();
            Ok::<_, TaskError>(match (stage, input) {
                (1, _) => Step::yield_future(async move {
                    tokio::time::sleep(Duration::from_millis(50)).await;
                    Ok(WORDS
                        .iter()
                        .filter(|w| w.starts_with(prefix.as_str()))
                        .map(|w| w.to_string())
                        .collect())
                }),
                (2, Some(mut hits)) => {
                    hits.sort_by_key(|w| w.len());
                    Step::yield_value(hits)
                }
                (_, hits) => Step::done(hits.unwrap_or_default()),
            })
        })
    });

    let task = TaskBuilder::new(search, ())
        .name("search")
        .mode(Mode::Restart)
        .bus(bus.clone())
        .build();

    let mut pending = Vec::new();
    for prefix in ["r", "ru", "rus"] {
        pending.push((prefix, task.perform(prefix.to_string())?));
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    for (prefix, settlement) in pending {
        match settlement.await? {
            Outcome::Completed(hits) => println!("[{prefix}] results: {hits:?}"),
            Outcome::Cancelled(_) => println!("[{prefix}] superseded"),
        }
    }

    // Let the subscriber workers drain before shutting the listener down.
    tokio::time::sleep(Duration::from_millis(20)).await;
    token.cancel();
    listener.await?;
    Ok(())
}
