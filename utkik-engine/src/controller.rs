//! The capture controller.

use std::sync::Arc;
use std::time::Duration;

use opentelemetry::KeyValue;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::Mutex;
use tokio::task::{spawn_blocking, JoinHandle};
use tokio::time::sleep;
use tracing::{debug, error, info};

use utkik_capture::SourceFactory;
use utkik_config::UtkikConfig;
use utkik_core::{CaptureSession, SessionStats};
use utkik_detection::HeuristicEngine;
use utkik_storage::RecordSink;
use utkik_telemetry::{EventLogger, MetricsRecorder};

use crate::error::EngineError;
use crate::pipeline::{run_capture_loop, PipelineContext};

/// Result of a start request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StartOutcome {
    Started { interface: String },
    AlreadyRunning,
}

/// Result of a stop request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StopOutcome {
    Stopped,
    NotRunning,
}

/// Owns the single capture session and everything it writes to.
///
/// All methods take `&self`; the controller is shared behind an `Arc`
/// between the API handlers and whatever else wants to poke the session.
pub struct CaptureController {
    config: UtkikConfig,
    session: Arc<CaptureSession>,
    sink: RecordSink,
    heuristics: Arc<HeuristicEngine>,
    metrics: Arc<MetricsRecorder>,
    source_factory: Arc<dyn SourceFactory>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl CaptureController {
    pub fn new(config: UtkikConfig, source_factory: Arc<dyn SourceFactory>) -> Self {
        info!("initializing capture controller");
        let sink = RecordSink::new(
            config.storage.primary_log.clone(),
            config.storage.suspicious_log.clone(),
            config.storage.diagnostic_log.clone(),
        );
        Self {
            session: Arc::new(CaptureSession::new()),
            sink,
            heuristics: Arc::new(HeuristicEngine::new()),
            metrics: Arc::new(MetricsRecorder::new()),
            source_factory,
            worker: Mutex::new(None),
            config,
        }
    }

    /// Starts a capture session unless one is already running.
    ///
    /// A predecessor worker that is still winding down is reaped first, so
    /// the logs are only reinitialized once it has fully let go of them.
    /// The new pipeline is then handed to a blocking worker. The source
    /// itself is opened inside the worker, so a start reports success as
    /// soon as the session is set up; a source that fails to open ends the
    /// session through the normal wind-down path.
    pub async fn start(
        &self,
        interface: Option<String>,
        filter_str: Option<String>,
    ) -> Result<StartOutcome, EngineError> {
        let mut worker = self.worker.lock().await;
        if self.session.is_running() {
            debug!("start requested while a session is active");
            return Ok(StartOutcome::AlreadyRunning);
        }

        // A stopped worker can sit inside its final poll for up to one poll
        // interval. Until it returns it still writes to the logs and reads
        // the running flag, so it must be gone before the session restarts.
        if let Some(handle) = worker.take() {
            if handle.await.is_err() {
                error!("previous capture worker panicked");
            }
        }

        let interface = interface.unwrap_or_else(|| self.config.capture.interface.clone());
        if let Some(filter) = filter_str {
            // Accepted for interface compatibility. Sessions always
            // capture with the fixed display filter.
            debug!(filter = %filter, "ignoring requested capture filter");
        }

        self.sink.initialize()?;
        self.sink
            .append_diagnostic(&format!("Starting capture on interface: {interface}"))?;
        self.session.begin(&interface);

        let handle = spawn_blocking({
            let ctx = PipelineContext {
                session: Arc::clone(&self.session),
                sink: self.sink.clone(),
                heuristics: Arc::clone(&self.heuristics),
                metrics: Arc::clone(&self.metrics),
                source_factory: Arc::clone(&self.source_factory),
                capture: self.config.capture.clone(),
                interface: interface.clone(),
            };
            move || run_capture_loop(ctx)
        });
        *worker = Some(handle);
        drop(worker);

        EventLogger::log_event(
            "capture_started",
            vec![KeyValue::new("interface", interface.clone())],
        )
        .await;
        Ok(StartOutcome::Started { interface })
    }

    /// Requests a cooperative stop of the running session.
    ///
    /// Clears the running flag and waits out the configured grace period so
    /// the worker has a chance to notice before the caller acts on the
    /// answer. Does not tear the worker down; the worker owns its own
    /// wind-down.
    pub async fn stop(&self) -> Result<StopOutcome, EngineError> {
        if !self.session.request_stop() {
            return Ok(StopOutcome::NotRunning);
        }

        self.sink.append_diagnostic("Stopping capture")?;
        EventLogger::log_event(
            "capture_stopped",
            vec![KeyValue::new("interface", self.session.interface())],
        )
        .await;

        sleep(Duration::from_millis(self.config.capture.stop_grace_ms)).await;
        Ok(StopOutcome::Stopped)
    }

    /// Snapshot of the session counters.
    pub fn status(&self) -> SessionStats {
        self.session.snapshot()
    }

    /// Records read back from the primary log.
    pub fn urls(&self) -> Result<Vec<Value>, EngineError> {
        Ok(self.sink.urls()?)
    }

    /// Entries read back from the suspicious-connection log.
    pub fn suspicious_connections(&self) -> Result<Vec<Value>, EngineError> {
        Ok(self.sink.suspicious_connections()?)
    }

    pub fn metrics(&self) -> &MetricsRecorder {
        &self.metrics
    }

    /// Blocks until the current worker finishes. Used by the one-shot CLI
    /// modes and by tests; the API never calls this. Holds the worker slot
    /// for the duration, so a concurrent `start` queues behind it.
    pub async fn wait_for_session_end(&self) -> Result<(), EngineError> {
        let mut worker = self.worker.lock().await;
        if let Some(handle) = worker.take() {
            handle.await.map_err(|_| EngineError::WorkerPanicked)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn start_outcome_json_shapes() {
        assert_eq!(
            serde_json::to_value(StartOutcome::Started {
                interface: "eth0".into()
            })
            .unwrap(),
            json!({"status": "started", "interface": "eth0"})
        );
        assert_eq!(
            serde_json::to_value(StartOutcome::AlreadyRunning).unwrap(),
            json!({"status": "already_running"})
        );
    }

    #[test]
    fn stop_outcome_json_shapes() {
        assert_eq!(
            serde_json::to_value(StopOutcome::Stopped).unwrap(),
            json!({"status": "stopped"})
        );
        assert_eq!(
            serde_json::to_value(StopOutcome::NotRunning).unwrap(),
            json!({"status": "not_running"})
        );
    }
}
