//! Capture-session state shared between the controller and the capture loop.
//!
//! The foreground flips `running`; the background loop reads it each poll
//! cycle and owns the counters. Plain atomics are enough here: updates are
//! scalar flips and increments, and staleness of one poll interval is
//! acceptable for a monitoring probe.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;

use crate::record::AppLayer;

/// Mutable state of the single live capture session.
#[derive(Debug, Default)]
pub struct CaptureSession {
    running: AtomicBool,
    packets_seen: AtomicU64,
    http_count: AtomicU64,
    tls_count: AtomicU64,
    dns_count: AtomicU64,
    interface: RwLock<String>,
    started_at: RwLock<Option<DateTime<Utc>>>,
}

/// Point-in-time view of the session, safe to hand to query callers.
#[derive(Clone, Debug, Serialize)]
pub struct SessionStats {
    pub running: bool,
    pub interface: String,
    pub started_at: Option<DateTime<Utc>>,
    pub packets_seen: u64,
    pub http_count: u64,
    pub tls_count: u64,
    pub dns_count: u64,
}

impl CaptureSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a fresh session: counters reset, interface recorded, flag set.
    /// Previous session state is discarded; only the logs keep history.
    pub fn begin(&self, interface: &str) {
        self.packets_seen.store(0, Ordering::Relaxed);
        self.http_count.store(0, Ordering::Relaxed);
        self.tls_count.store(0, Ordering::Relaxed);
        self.dns_count.store(0, Ordering::Relaxed);
        *self.interface.write() = interface.to_string();
        *self.started_at.write() = Some(Utc::now());
        self.running.store(true, Ordering::SeqCst);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    /// Requests cooperative termination. Returns whether a session was
    /// actually running.
    pub fn request_stop(&self) -> bool {
        self.running.swap(false, Ordering::SeqCst)
    }

    /// Called by the loop on its own exit paths (duration bound, source
    /// exhaustion) so queries see the session as ended.
    pub fn clear_running(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    pub fn record_packet(&self, layer: Option<AppLayer>) {
        self.packets_seen.fetch_add(1, Ordering::Relaxed);
        match layer {
            Some(AppLayer::Http) => self.http_count.fetch_add(1, Ordering::Relaxed),
            Some(AppLayer::Tls) => self.tls_count.fetch_add(1, Ordering::Relaxed),
            Some(AppLayer::Dns) => self.dns_count.fetch_add(1, Ordering::Relaxed),
            None => 0,
        };
    }

    pub fn interface(&self) -> String {
        self.interface.read().clone()
    }

    pub fn snapshot(&self) -> SessionStats {
        SessionStats {
            running: self.is_running(),
            interface: self.interface(),
            started_at: *self.started_at.read(),
            packets_seen: self.packets_seen.load(Ordering::Relaxed),
            http_count: self.http_count.load(Ordering::Relaxed),
            tls_count: self.tls_count.load(Ordering::Relaxed),
            dns_count: self.dns_count.load(Ordering::Relaxed),
        }
    }
}
