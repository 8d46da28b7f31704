//! ## utkik-telemetry::metrics
//! **Prometheus counters for the capture pipeline**
//!
//! One registry per probe, hand-registered counters, text-format export
//! for the `/metrics` endpoint.

use prometheus::{IntCounter, IntCounterVec, Opts, Registry};

#[derive(Debug, Clone)]
pub struct MetricsRecorder {
    pub registry: Registry,
    /// Every packet taken from the source, classified or not.
    pub packets_total: IntCounter,
    /// Records that passed the identity filter and hit the primary log.
    pub records_written_total: IntCounter,
    /// Records flagged by at least one heuristic.
    pub suspicious_total: IntCounter,
    /// Classified packets by application layer.
    pub app_layer_total: IntCounterVec,
    /// Transient source faults and undecodable lines the loop survived.
    pub source_errors_total: IntCounter,
}

impl Default for MetricsRecorder {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsRecorder {
    pub fn new() -> Self {
        let registry = Registry::new();

        let packets_total =
            IntCounter::new("utkik_packets_total", "Total packets polled from the source")
                .unwrap();
        let records_written_total = IntCounter::new(
            "utkik_records_written_total",
            "Records written to the primary log",
        )
        .unwrap();
        let suspicious_total = IntCounter::new(
            "utkik_suspicious_total",
            "Records flagged by suspicion heuristics",
        )
        .unwrap();
        let app_layer_total = IntCounterVec::new(
            Opts::new("utkik_app_layer_total", "Classified packets by app layer"),
            &["layer"],
        )
        .unwrap();
        let source_errors_total = IntCounter::new(
            "utkik_source_errors_total",
            "Transient capture source errors and undecodable lines",
        )
        .unwrap();

        registry.register(Box::new(packets_total.clone())).unwrap();
        registry
            .register(Box::new(records_written_total.clone()))
            .unwrap();
        registry.register(Box::new(suspicious_total.clone())).unwrap();
        registry.register(Box::new(app_layer_total.clone())).unwrap();
        registry
            .register(Box::new(source_errors_total.clone()))
            .unwrap();

        Self {
            registry,
            packets_total,
            records_written_total,
            suspicious_total,
            app_layer_total,
            source_errors_total,
        }
    }

    /// Renders the registry in Prometheus text format.
    pub fn gather_metrics(&self) -> Result<String, prometheus::Error> {
        use prometheus::Encoder;
        let encoder = prometheus::TextEncoder::new();
        let mut buffer = Vec::<u8>::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_show_up_in_text_export() {
        let metrics = MetricsRecorder::new();
        metrics.packets_total.inc_by(3);
        metrics.app_layer_total.with_label_values(&["http"]).inc();

        let text = metrics.gather_metrics().unwrap();
        assert!(text.contains("utkik_packets_total 3"));
        assert!(text.contains("utkik_app_layer_total{layer=\"http\"} 1"));
    }

    #[test]
    fn fresh_recorders_are_independent() {
        let a = MetricsRecorder::new();
        let b = MetricsRecorder::new();
        a.suspicious_total.inc();
        assert_eq!(b.suspicious_total.get(), 0);
    }
}
