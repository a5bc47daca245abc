//! Configuration management for markfarm
//!
//! Report and naming settings are layered with figment: the embedded
//! `default-config.toml`, then `markfarm.toml` (or `--config <FILE>`), then
//! `MARKFARM_*` environment variables. Run parameters (degree, directories,
//! delay) only ever come from the command line and are checked by
//! [`RunSettings`].

pub mod core;
pub mod settings;


pub use core::{MarkfarmConfig, OutputConfig};
pub use settings::{RunSettings, clamp_delay, parse_degree};
