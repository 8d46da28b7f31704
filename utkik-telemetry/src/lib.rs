//! # utkik-telemetry
//!
//! Logging and metrics for the probe.

pub mod logging;
pub mod metrics;

pub use logging::EventLogger;
pub use metrics::MetricsRecorder;
