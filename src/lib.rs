//! PageMirror library
//!
//! Exposes the replay pipeline for the CLI and integration tests

pub mod config;
pub mod replay;
pub mod report;
pub mod script;

pub use config::{load_config, Config, LoadedConfig};
pub use replay::{Changelist, ReplayError, ReplayReport, Replayer};
pub use script::{NodeSpec, ReplayScript, Step};
