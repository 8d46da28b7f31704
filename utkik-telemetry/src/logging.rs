//! ## utkik-telemetry::logging
//! **Structured logging with tracing and OpenTelemetry**
//!
//! All crates log through `tracing`; this module owns subscriber setup and
//! a helper for the probe's lifecycle events (capture started and stopped,
//! suspicious connection seen), each carrying OpenTelemetry key-values.

use opentelemetry::KeyValue;
use tracing::{info_span, Instrument};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Clone)]
pub struct EventLogger;

impl EventLogger {
    /// Installs the global subscriber. `RUST_LOG` wins; `info` otherwise.
    pub fn init() {
        fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .with_thread_names(true)
            .with_span_events(FmtSpan::ENTER)
            .init()
    }

    /// Emits one structured lifecycle event.
    pub async fn log_event(event_type: &str, metadata: Vec<KeyValue>) {
        let span = info_span!(
            "probe_event",
            event_type = event_type,
            otel.kind = "INTERNAL"
        );

        async {
            tracing::info!(
                metadata = ?metadata,
                "Probe event recorded"
            );
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
mod tests {
    use tracing_test::traced_test;

    use super::*;

    #[traced_test]
    #[test]
    fn lifecycle_events_reach_the_subscriber() {
        tokio::runtime::Runtime::new()
            .unwrap()
            .block_on(EventLogger::log_event(
                "capture_started",
                vec![KeyValue::new("interface", "eth0")],
            ));
        assert!(logs_contain("Probe event recorded"));
    }
}
