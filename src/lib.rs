//! # markfarm - batch image marking on a hand-built parallel engine
//!
//! markfarm applies a fixed mark to every image of a directory and reports
//! throughput and latency for three execution strategies:
//!
//! - **sequential**: one thread, no queues
//! - **farm**: N lanes, each loading, marking and storing a job
//! - **pipeline**: N lanes of chained stages (Mark → Store, or
//!   Load → Mark → Store without pre-loading)
//!
//! The engine in [`parallel`] is built from blocking queues, a round-robin
//! Emitter, per-lane stage workers and a Collector that stops after one
//! shutdown per lane. Every job carries its own per-phase timings, which the
//! [`reports::PerformanceRecorder`] turns into means and a per-job table.
//!
//! ## Quick Start
//!
//! ```bash
//! markfarm farm 4 ./images ./mark.png 0
//! markfarm pipeline 2 ./images ./mark.png 10 --no-preload
//! MARKFARM_OUTPUT__FORMAT=json markfarm sequential ./images ./mark.png
//! ```

pub mod cli;
pub mod codec;
pub mod config;
pub mod error;
pub mod parallel;
pub mod reports;
pub mod shared;

pub use cli::{Cli, Output};
pub use config::MarkfarmConfig;
pub use error::MarkError;

/// Result type alias for markfarm operations
pub type Result<T> = anyhow::Result<T>;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
