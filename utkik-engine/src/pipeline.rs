//! The capture pipeline: poll, classify, persist.
//!
//! Runs on a blocking thread for the lifetime of one session. The loop
//! keeps going while the session flag is set and the session age is under
//! the configured bound; every poll timeout is also a cancellation point,
//! so a stop request is honored within one poll interval.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, error, info, instrument, warn};

use utkik_capture::{PacketBatch, SourceError, SourceFactory};
use utkik_classify::classify;
use utkik_config::CaptureConfig;
use utkik_core::{CaptureSession, SuspiciousRecord};
use utkik_detection::HeuristicEngine;
use utkik_storage::RecordSink;
use utkik_telemetry::MetricsRecorder;

/// Wireshark display filter every session captures with. Narrowing happens
/// here, not in BPF, so the dissector sees full streams.
pub const DISPLAY_FILTER: &str = "http or tls or dns";

/// Everything one session worker needs, cloned out of the controller.
pub struct PipelineContext {
    pub session: Arc<CaptureSession>,
    pub sink: RecordSink,
    pub heuristics: Arc<HeuristicEngine>,
    pub metrics: Arc<MetricsRecorder>,
    pub source_factory: Arc<dyn SourceFactory>,
    pub capture: CaptureConfig,
    pub interface: String,
}

/// Runs one capture session to completion.
///
/// Always winds down the session on exit: clears the running flag, appends
/// the `capture_end` marker to the primary log and stamps the diagnostic
/// trailer, whether the loop ended by stop request, session bound, source
/// exhaustion or a failed source open.
#[instrument(skip_all, fields(interface = %ctx.interface))]
pub fn run_capture_loop(ctx: PipelineContext) {
    let started = Instant::now();
    let max_session = Duration::from_secs(ctx.capture.max_session_secs);
    let poll_interval = Duration::from_millis(ctx.capture.poll_interval_ms);

    match ctx.source_factory.open(&ctx.interface, DISPLAY_FILTER) {
        Ok(mut source) => {
            info!("capture session started");
            while ctx.session.is_running() && started.elapsed() < max_session {
                match source.poll(poll_interval) {
                    Ok(batch) => process_batch(&ctx, batch),
                    Err(SourceError::Exhausted) => {
                        debug!("capture source exhausted");
                        break;
                    }
                    Err(err) => {
                        ctx.metrics.source_errors_total.inc();
                        warn!(error = %err, "error during packet capture");
                        diag(&ctx.sink, &format!("Error during packet capture: {err}"));
                    }
                }
            }
        }
        Err(err) => {
            error!(error = %err, "failed to open capture source");
            diag(&ctx.sink, &format!("Capture error: {err}"));
        }
    }

    ctx.session.clear_running();
    if let Err(error) = ctx.sink.finalize() {
        error!(%error, "failed to write session end marker");
    }
    diag(&ctx.sink, "=== Network Traffic Capture Ended ===");

    let stats = ctx.session.snapshot();
    info!(
        packets = stats.packets_seen,
        duration_secs = started.elapsed().as_secs(),
        "capture session ended"
    );
}

fn process_batch(ctx: &PipelineContext, batch: PacketBatch) {
    if batch.malformed > 0 {
        ctx.metrics.source_errors_total.inc_by(batch.malformed as u64);
        diag(
            &ctx.sink,
            &format!("Error processing packet: {} undecodable lines", batch.malformed),
        );
    }

    for packet in &batch.packets {
        let record = classify(packet, &ctx.heuristics);

        ctx.session.record_packet(record.layer);
        ctx.metrics.packets_total.inc();
        if let Some(layer) = record.layer {
            ctx.metrics.app_layer_total.with_label_values(&[layer.as_str()]).inc();
        }

        // Suspicious entries are written before the identity filter so a
        // flagged record survives even when it resolves no identity.
        if record.suspicious {
            ctx.metrics.suspicious_total.inc();
            warn!(
                event_type = "suspicious_connection",
                domain = record.domain.as_deref().unwrap_or(""),
                reasons = ?record.suspicious_reasons,
                "suspicious connection detected"
            );
            if let Err(error) = ctx.sink.append_suspicious(&SuspiciousRecord::new(record.clone())) {
                diag(&ctx.sink, &format!("Error processing packet: {error}"));
            }
        }

        match ctx.sink.append(&record) {
            Ok(true) => ctx.metrics.records_written_total.inc(),
            Ok(false) => {}
            Err(error) => diag(&ctx.sink, &format!("Error processing packet: {error}")),
        }
    }
}

fn diag(sink: &RecordSink, message: &str) {
    if let Err(error) = sink.append_diagnostic(message) {
        warn!(%error, "failed to append diagnostic: {}", message);
    }
}
