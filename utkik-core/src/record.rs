//! Record types for observed network events.
//!
//! A `ClassifiedRecord` is one interesting event reconstructed from a
//! dissected packet. Absent fields are omitted from the JSON form, so log
//! lines only carry what the packet actually exposed.

use std::fmt;
use std::net::IpAddr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Transport-layer protocol as reported by the dissector.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransportProtocol {
    Tcp,
    Udp,
}

impl fmt::Display for TransportProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportProtocol::Tcp => write!(f, "TCP"),
            TransportProtocol::Udp => write!(f, "UDP"),
        }
    }
}

/// Application layer assigned to a record. Exactly one per packet, selected
/// by priority HTTP > TLS > DNS.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppLayer {
    Http,
    Tls,
    Dns,
}

impl AppLayer {
    /// Lowercase layer name, as used in log lines and metric labels.
    pub fn as_str(&self) -> &'static str {
        match self {
            AppLayer::Http => "http",
            AppLayer::Tls => "tls",
            AppLayer::Dns => "dns",
        }
    }
}

impl fmt::Display for AppLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One observed network event with whatever identity could be resolved.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ClassifiedRecord {
    /// Capture-time instant of the packet, not of processing.
    pub timestamp: DateTime<Utc>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocol: Option<TransportProtocol>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub src_ip: Option<IpAddr>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dst_ip: Option<IpAddr>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub src_port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dst_port: Option<u16>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub layer: Option<AppLayer>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sni: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dns_query: Option<String>,

    #[serde(default, skip_serializing_if = "is_false")]
    pub suspicious: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suspicious_reasons: Vec<String>,
}

fn is_false(v: &bool) -> bool {
    !v
}

impl ClassifiedRecord {
    pub fn new(timestamp: DateTime<Utc>, protocol: Option<TransportProtocol>) -> Self {
        Self {
            timestamp,
            protocol,
            src_ip: None,
            dst_ip: None,
            src_port: None,
            dst_port: None,
            layer: None,
            url: None,
            domain: None,
            sni: None,
            dns_query: None,
            suspicious: false,
            suspicious_reasons: Vec::new(),
        }
    }

    /// Whether the record resolved any destination identity. Records that
    /// carry only IP/port metadata are noise and never reach the primary log.
    pub fn has_identity(&self) -> bool {
        self.url.is_some() || self.domain.is_some() || self.sni.is_some() || self.dns_query.is_some()
    }

    /// Marks the record suspicious with the given ordered reasons.
    pub fn flag(&mut self, reasons: Vec<String>) {
        if !reasons.is_empty() {
            self.suspicious = true;
            self.suspicious_reasons = reasons;
        }
    }
}

/// A flagged record as written to the suspicious log: the full record plus
/// the wall-clock instant the heuristics fired.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SuspiciousRecord {
    #[serde(flatten)]
    pub record: ClassifiedRecord,
    pub detected_at: DateTime<Utc>,
}

impl SuspiciousRecord {
    pub fn new(record: ClassifiedRecord) -> Self {
        Self {
            record,
            detected_at: Utc::now(),
        }
    }
}

/// Session boundary entry interleaved with data records in the logs.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SessionMarker {
    CaptureStart { timestamp: DateTime<Utc> },
    CaptureEnd { timestamp: DateTime<Utc> },
}

impl SessionMarker {
    pub fn start_now() -> Self {
        SessionMarker::CaptureStart {
            timestamp: Utc::now(),
        }
    }

    pub fn end_now() -> Self {
        SessionMarker::CaptureEnd {
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> ClassifiedRecord {
        ClassifiedRecord::new(Utc::now(), Some(TransportProtocol::Tcp))
    }

    #[test]
    fn absent_fields_are_omitted_from_json() {
        let json = serde_json::to_value(record()).unwrap();
        let obj = json.as_object().unwrap();
        assert_eq!(obj.get("protocol").unwrap(), "TCP");
        assert!(!obj.contains_key("url"));
        assert!(!obj.contains_key("suspicious"));
        assert!(!obj.contains_key("suspicious_reasons"));
    }

    #[test]
    fn flagged_record_serializes_reasons() {
        let mut rec = record();
        rec.flag(vec!["Insecure HTTP connection".into()]);
        let json = serde_json::to_value(&rec).unwrap();
        assert_eq!(json["suspicious"], true);
        assert_eq!(json["suspicious_reasons"][0], "Insecure HTTP connection");
    }

    #[test]
    fn flag_with_no_reasons_is_a_no_op() {
        let mut rec = record();
        rec.flag(Vec::new());
        assert!(!rec.suspicious);
    }

    #[test]
    fn identity_requires_a_resolved_field() {
        let mut rec = record();
        rec.src_ip = Some("10.0.0.1".parse().unwrap());
        rec.dst_port = Some(443);
        assert!(!rec.has_identity());
        rec.domain = Some("example.com".into());
        assert!(rec.has_identity());
    }

    #[test]
    fn marker_json_shape() {
        let json = serde_json::to_value(SessionMarker::start_now()).unwrap();
        assert_eq!(json["event"], "capture_start");
        assert!(json.get("timestamp").is_some());
    }

    #[test]
    fn suspicious_record_flattens_into_one_object() {
        let mut rec = record();
        rec.url = Some("http://evil.test/login".into());
        rec.flag(vec!["Insecure HTTP connection".into()]);
        let json = serde_json::to_value(SuspiciousRecord::new(rec)).unwrap();
        assert_eq!(json["url"], "http://evil.test/login");
        assert!(json.get("detected_at").is_some());
        assert!(json.get("record").is_none());
    }
}
