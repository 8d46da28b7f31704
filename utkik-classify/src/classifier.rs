//! Packet classification.
//!
//! One dissected packet in, one classified record out, always. Layer
//! priority is HTTP, then TLS, then DNS, so a packet dissected as several
//! layers is attributed to the most specific one. Identity fields are
//! filled from whatever the chosen layer exposed; a record that ends up
//! with no identity is still returned so counters and heuristics see it.

use tracing::debug;

use utkik_capture::DissectedPacket;
use utkik_core::{AppLayer, ClassifiedRecord};
use utkik_detection::HeuristicEngine;

use crate::domain::extract_domain;

/// Classifies one packet and applies the suspicion heuristics.
pub fn classify(packet: &DissectedPacket, heuristics: &HeuristicEngine) -> ClassifiedRecord {
    let protocol = packet.transport.as_ref().map(|t| t.protocol);
    let mut record = ClassifiedRecord::new(packet.sniff_time, protocol);

    if let Some(network) = &packet.network {
        record.src_ip = Some(network.src);
        record.dst_ip = Some(network.dst);
        if let Some(transport) = &packet.transport {
            record.src_port = Some(transport.src_port);
            record.dst_port = Some(transport.dst_port);
        }
    }

    if let Some(http) = &packet.http {
        record.layer = Some(AppLayer::Http);
        if let Some(full_uri) = &http.request_full_uri {
            record.url = Some(full_uri.clone());
            record.domain = extract_domain(full_uri);
            debug!(url = %full_uri, "http request");
        } else if let Some(host) = &http.host {
            let path = http.request_uri.as_deref().unwrap_or("/");
            let url = format!("http://{host}{path}");
            debug!(url = %url, "http host and path");
            record.url = Some(url);
            record.domain = Some(host.clone());
        }
    } else if let Some(tls) = &packet.tls {
        record.layer = Some(AppLayer::Tls);
        if let Some(server_name) = &tls.server_name {
            debug!(sni = %server_name, "tls client hello");
            record.sni = Some(server_name.clone());
            record.domain = Some(server_name.clone());
            record.url = Some(format!("https://{server_name}/"));
        }
    } else if let Some(dns) = &packet.dns {
        record.layer = Some(AppLayer::Dns);
        if let Some(query_name) = &dns.query_name {
            debug!(query = %query_name, "dns query");
            record.dns_query = Some(query_name.clone());
            record.domain = Some(query_name.clone());
            record.url = Some(format!("http://{query_name}/"));
        }
    }

    let reasons = heuristics.evaluate(&record);
    record.flag(reasons);
    record
}
