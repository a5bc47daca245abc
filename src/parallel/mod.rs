//! Parallel execution engine
//!
//! A run is laid out as:
//!
//! ```text
//!            ┌── lane 0: stage → stage ──┐
//! Emitter ───┼── lane 1: stage → stage ──┼──▶ Collector ──▶ PerformanceRecorder
//!            └── lane N-1: ...          ──┘
//! ```
//!
//! Every arrow is a [`BlockingQueue`] carrying [`WorkItem`]s. A job is owned
//! by exactly one thread at a time and changes hands only through a queue.
//! The Emitter deals jobs round robin starting at lane 0, then pushes one
//! [`WorkItem::Shutdown`] per lane. Each stage forwards the shutdown it sees
//! and exits, so the Collector stops after exactly N shutdowns.
//!
//! Threads are scoped with `crossbeam::thread::scope`, which lets every
//! stage borrow the codec, the counters and the queues without `Arc`.
//!
//! # Example
//!
//! ```rust,no_run
//! use markfarm::codec::{ImageCodec, MarkRegion};
//! use markfarm::parallel::{ExecutionStrategy, RunOptions};
//! use markfarm::reports::PerformanceRecorder;
//! use markfarm::shared::DirectoryInput;
//! use std::path::Path;
//!
//! # fn main() -> Result<(), markfarm::error::MarkError> {
//! let codec = ImageCodec::load(Path::new("mark.png"), MarkRegion::default())?;
//! let strategy = ExecutionStrategy::Farm { lanes: 4 };
//! let mut recorder = PerformanceRecorder::new(strategy.phases());
//! let totals = strategy.execute(
//!     &DirectoryInput::new("images"),
//!     &codec,
//!     &mut recorder,
//!     &RunOptions::default(),
//! )?;
//! println!("{} processed, {} dropped", recorder.len(), totals.dropped);
//! # Ok(())
//! # }
//! ```

pub mod collector;
pub mod core;
pub mod emitter;
pub mod job;
pub mod progress;
pub mod queue;
pub mod stage;
pub mod stats;

#[cfg(test)]
pub(crate) mod testing;

pub use collector::{Collector, CollectorReport};
pub use core::{ExecutionStrategy, ParallelExecutor, RunOptions, SequentialExecutor};
pub use emitter::{EmitReport, Emitter, RoundRobin};
pub use job::{Job, Phase, Span, StageKind, Timings, WorkItem};
pub use progress::RunProgress;
pub use queue::BlockingQueue;
pub use stage::{LaneReport, StageWorker};
pub use stats::{RunStats, RunTotals};
