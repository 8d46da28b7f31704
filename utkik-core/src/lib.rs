//! # utkik-core
//!
//! Shared data model for the capture pipeline: classified records, the
//! session markers written around them, and the mutable capture-session
//! state the controller and capture loop share.

pub mod record;
pub mod session;

pub use record::{AppLayer, ClassifiedRecord, SessionMarker, SuspiciousRecord, TransportProtocol};
pub use session::{CaptureSession, SessionStats};
