//! MergeX clip merger library
//!
//! Compiles an ordered clip list plus transform options (speed, resolution,
//! volume) into a single ffmpeg filter graph and drives the engine to one
//! terminal outcome per merge.

pub mod adapters;
pub mod app;
pub mod cli;
pub mod config_initialization;
pub mod domain;
pub mod error;
pub mod ports;

// Re-export commonly used types
pub use app::{BridgePayload, MergeInteractor, MergeSettings, ResultSink};
pub use domain::compiler::{compile, compile_request};
pub use domain::errors::DomainError;
pub use domain::model::{MergeCommand, MergeOutput, MergeRequest, Resolution, TransformOptions};
pub use error::{MergeXError, MergeXResult};
