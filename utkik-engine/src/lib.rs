//! # utkik-engine
//!
//! Session orchestration. The [`CaptureController`] owns exactly one
//! capture session at a time: it prepares the logs, spawns the pipeline
//! worker on a blocking thread, and answers stop and query requests while
//! the worker runs. The pipeline itself lives in [`pipeline`] and is a
//! plain synchronous loop over a [`utkik_capture::PacketSource`].

pub mod controller;
pub mod error;
pub mod pipeline;

pub use controller::{CaptureController, StartOutcome, StopOutcome};
pub use error::EngineError;
pub use pipeline::DISPLAY_FILTER;
