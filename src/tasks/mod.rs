//! # Work definitions and task construction.
//!
//! This module provides the types a caller implements or configures:
//! - [`Routine`] - resumable state machine behind one operation
//! - [`RoutineFn`] - closure-backed routine
//! - [`Generator`] - reusable work function that creates a routine per invocation
//! - [`GeneratorFn`] - closure-backed generator
//! - [`Mode`] - admission mode of a task
//! - [`TaskBuilder`] - fluent task construction

mod builder;
mod generator;
mod mode;
mod routine;

pub use builder::TaskBuilder;
pub use generator::{Generator, GeneratorFn};
pub use mode::Mode;
pub(crate) use mode::ModeSetting;
pub use routine::{BoxRoutine, Routine, RoutineFn, Step, Suspend};
