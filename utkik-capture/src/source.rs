//! Packet source abstraction.
//!
//! The capture loop never talks to a dissector directly. It holds a boxed
//! [`PacketSource`] and polls it with a timeout, so live capture, replay
//! and tests all drive the same loop.

use std::time::Duration;

use thiserror::Error;

use crate::packet::DissectedPacket;

/// Errors surfaced by packet sources.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The dissector process could not be started or wired up.
    #[error("failed to start capture source: {0}")]
    Spawn(#[from] std::io::Error),

    /// A scenario file could not be read or parsed.
    #[error("failed to load scenario: {0}")]
    Scenario(#[from] serde_yaml::Error),

    /// The source has no more packets and never will. Terminal: the
    /// capture loop ends the session when it sees this.
    #[error("capture source exhausted")]
    Exhausted,
}

/// One round of polling: the packets that decoded cleanly plus a count of
/// lines the source could not decode.
#[derive(Debug, Default)]
pub struct PacketBatch {
    pub packets: Vec<DissectedPacket>,
    pub malformed: usize,
}

impl PacketBatch {
    pub fn is_empty(&self) -> bool {
        self.packets.is_empty() && self.malformed == 0
    }
}

/// A producer of dissected packets.
pub trait PacketSource: Send {
    /// Waits up to `timeout` for traffic and returns whatever arrived.
    ///
    /// An empty batch is a normal quiet interval. [`SourceError::Exhausted`]
    /// means the source is done for good; any other error is a transient
    /// fault the caller may log and retry.
    fn poll(&mut self, timeout: Duration) -> Result<PacketBatch, SourceError>;
}

/// Opens sources on demand. The controller owns a factory rather than a
/// source so that each session gets a fresh source, opened inside the
/// session worker.
pub trait SourceFactory: Send + Sync {
    fn open(
        &self,
        interface: &str,
        display_filter: &str,
    ) -> Result<Box<dyn PacketSource>, SourceError>;
}
