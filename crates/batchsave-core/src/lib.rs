//! Resilient batch media transfer: fetch many remote files and deliver them either
//! as one ZIP archive or as individual throttled saves, depending on the client.

pub mod config;
pub mod logging;

pub mod archive;
pub mod checksum;
pub mod control;
pub mod engine;
pub mod error;
pub mod job;
pub mod manifest;
pub mod messages;
pub mod network;
pub mod resolver;
pub mod retry;
pub mod scheduler;
pub mod strategy;
pub mod transport;
pub mod url_model;

pub use control::CancelToken;
pub use engine::{EngineOptions, JobReport, TransferEngine};
pub use error::EngineError;
pub use job::{JobState, Outcome, TransferJob, TransferUnit};
pub use strategy::{ClientHints, Strategy};
