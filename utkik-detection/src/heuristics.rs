//! Built-in suspicion heuristics.

use utkik_core::{AppLayer, ClassifiedRecord};

/// Destination ports worth flagging, with the service name quoted in the
/// reason string.
const RISKY_PORTS: &[(u16, &str)] = &[
    (22, "SSH"),
    (23, "Telnet"),
    (445, "SMB"),
    (1080, "SOCKS proxy"),
    (3389, "RDP"),
    (4444, "Metasploit"),
    (5800, "VNC"),
    (5900, "VNC"),
    (6667, "IRC"),
    (9001, "Tor"),
];

/// A single suspicion check over one classified record.
pub trait Heuristic: Send + Sync {
    fn name(&self) -> &'static str;

    /// Returns a reason string when the record trips this heuristic.
    fn inspect(&self, record: &ClassifiedRecord) -> Option<String>;
}

/// Flags any plaintext HTTP traffic.
pub struct InsecureTransport;

impl Heuristic for InsecureTransport {
    fn name(&self) -> &'static str {
        "insecure_transport"
    }

    fn inspect(&self, record: &ClassifiedRecord) -> Option<String> {
        if record.layer == Some(AppLayer::Http) {
            Some("Insecure HTTP connection".to_string())
        } else {
            None
        }
    }
}

/// Flags connections whose destination port belongs to a service commonly
/// abused for remote access, tunneling or command channels.
pub struct RiskyDestinationPort;

impl Heuristic for RiskyDestinationPort {
    fn name(&self) -> &'static str {
        "risky_destination_port"
    }

    fn inspect(&self, record: &ClassifiedRecord) -> Option<String> {
        let port = record.dst_port?;
        RISKY_PORTS
            .iter()
            .find(|(risky, _)| *risky == port)
            .map(|(_, service)| format!("Connection to suspicious port {service}"))
    }
}

/// Runs every heuristic against a record, in registration order.
pub struct HeuristicEngine {
    heuristics: Vec<Box<dyn Heuristic>>,
}

impl HeuristicEngine {
    /// Builds the engine with the built-in heuristic set.
    pub fn new() -> Self {
        Self {
            heuristics: vec![Box::new(InsecureTransport), Box::new(RiskyDestinationPort)],
        }
    }

    /// Collects the reasons contributed by each matching heuristic. An
    /// empty vector means the record is clean.
    pub fn evaluate(&self, record: &ClassifiedRecord) -> Vec<String> {
        self.heuristics
            .iter()
            .filter_map(|heuristic| heuristic.inspect(record))
            .collect()
    }
}

impl Default for HeuristicEngine {
    fn default() -> Self {
        Self::new()
    }
}
