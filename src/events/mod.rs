//! Task events: types and broadcast bus.
//!
//! This module groups the event **data model** and the **bus** used to
//! publish/subscribe to events emitted by tasks, operations and subscriber workers.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: `Task` (creation, admission, mode rejection), `Operation`
//!   (start, cancel request, settlement), `SubscriberSet` workers (overflow/panic).
//! - **Consumers**: [`spawn_listener`](crate::spawn_listener), which fans events out
//!   to a [`SubscriberSet`](crate::SubscriberSet).

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
