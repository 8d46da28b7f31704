//! Dissected packet representation.
//!
//! A [`DissectedPacket`] is the protocol summary of a single captured frame,
//! one optional struct per dissected layer. Sources fill in whatever the
//! dissector exposed; absent layers stay `None` and the classifier decides
//! what the packet amounts to.

use std::net::IpAddr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use utkik_core::TransportProtocol;

/// Network layer addressing, IPv4 or IPv6.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkLayer {
    pub src: IpAddr,
    pub dst: IpAddr,
}

/// Transport layer endpoints.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransportLayer {
    pub protocol: TransportProtocol,
    pub src_port: u16,
    pub dst_port: u16,
}

/// Fields of an HTTP request layer. Any of them may be missing on
/// continuation segments or partial dissection.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpLayer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_full_uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_uri: Option<String>,
}

/// TLS layer. The server name is only present on a ClientHello carrying SNI.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TlsLayer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_name: Option<String>,
}

/// DNS layer. Responses repeat the query name, so both directions carry it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnsLayer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_name: Option<String>,
}

/// One captured frame after dissection.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DissectedPacket {
    /// Capture timestamp reported by the dissector.
    pub sniff_time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network: Option<NetworkLayer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transport: Option<TransportLayer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http: Option<HttpLayer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tls: Option<TlsLayer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dns: Option<DnsLayer>,
}

impl DissectedPacket {
    /// Creates a packet with no dissected layers.
    pub fn new(sniff_time: DateTime<Utc>) -> Self {
        Self {
            sniff_time,
            network: None,
            transport: None,
            http: None,
            tls: None,
            dns: None,
        }
    }

    pub fn with_network(mut self, src: IpAddr, dst: IpAddr) -> Self {
        self.network = Some(NetworkLayer { src, dst });
        self
    }

    pub fn with_transport(
        mut self,
        protocol: TransportProtocol,
        src_port: u16,
        dst_port: u16,
    ) -> Self {
        self.transport = Some(TransportLayer {
            protocol,
            src_port,
            dst_port,
        });
        self
    }

    pub fn with_http(mut self, http: HttpLayer) -> Self {
        self.http = Some(http);
        self
    }

    pub fn with_tls(mut self, tls: TlsLayer) -> Self {
        self.tls = Some(tls);
        self
    }

    pub fn with_dns(mut self, dns: DnsLayer) -> Self {
        self.dns = Some(dns);
        self
    }
}
