//! # utkik-classify
//!
//! Turns dissected packets into classified records: picks the most
//! specific application layer, derives the domain and URL identity, and
//! runs the suspicion heuristics over the result.

pub mod classifier;
pub mod domain;

pub use classifier::classify;
pub use domain::extract_domain;
