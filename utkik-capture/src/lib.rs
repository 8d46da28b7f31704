//! # utkik-capture
//!
//! The capture boundary of the probe: the dissected-packet shape the
//! classification pipeline consumes, and the sources that produce it.
//!
//! Two sources ship with the crate. [`TsharkSource`] drives a `tshark`
//! field extractor over a live interface; [`ScriptedSource`] replays a
//! fixed packet sequence for deterministic tests and scenario replay.

pub mod packet;
pub mod scripted;
pub mod source;
pub mod tshark;

pub use packet::{DissectedPacket, DnsLayer, HttpLayer, NetworkLayer, TlsLayer, TransportLayer};
pub use scripted::{ScriptedSource, ScriptedSourceFactory};
pub use source::{PacketBatch, PacketSource, SourceError, SourceFactory};
pub use tshark::{TsharkSource, TsharkSourceFactory};
