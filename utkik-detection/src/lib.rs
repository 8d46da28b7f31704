//! # utkik-detection
//!
//! Suspicion heuristics applied to every classified record. Each heuristic
//! is a small trait object that either clears a record or contributes one
//! human-readable reason; the engine runs them in a fixed order so reason
//! lists stay stable across runs.

pub mod heuristics;

pub use heuristics::{Heuristic, HeuristicEngine, InsecureTransport, RiskyDestinationPort};
