//! CLI command handlers, one file per command.

mod checksum;
mod run;
mod strategy;

pub use checksum::run_checksum;
pub use run::{run_manifest, RunArgs};
pub use strategy::run_strategy;
