//! # Event subscribers.
//!
//! This module provides the [`Subscribe`] trait, the [`SubscriberSet`] fan-out and the
//! [`spawn_listener`] bridge that feeds the set from a [`Bus`](crate::Bus).
//!
//! ## Architecture
//! ```text
//! Event flow:
//!   Task / Operation ── publish(Event) ──► Bus ──► spawn_listener ──► SubscriberSet::emit
//!                                                                  ┌────┴────┬─────────┐
//!                                                                  ▼         ▼         ▼
//!                                                              LogWriter  Metrics   Custom
//! ```

#[cfg(feature = "logging")]
mod log;

mod listener;
mod set;
mod subscriber;

pub use listener::spawn_listener;
pub use set::SubscriberSet;
pub use subscriber::Subscribe;

#[cfg(feature = "logging")]
pub use log::LogWriter;
