//! # utkik-storage
//!
//! Append-only JSON-Lines persistence for capture sessions: the primary
//! record log, the suspicious-connection log and a plain-text diagnostic
//! log. Files are opened per write so readers never race a held handle.

pub mod error;
pub mod sink;

pub use error::StorageError;
pub use sink::RecordSink;
