//! Live capture through a `tshark` field extractor.
//!
//! The probe does not dissect packets itself. It runs `tshark -T fields`
//! with a fixed selector list and decodes one tab-separated line per
//! packet. A reader thread pumps child stdout into a bounded channel;
//! [`TsharkSource::poll`] blocks on that channel up to the poll timeout
//! and drains what has accumulated.

use std::io::{BufRead, BufReader};
use std::process::{Child, Command, Stdio};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use chrono::{DateTime, Utc};
use crossbeam::channel::{self, Receiver, RecvTimeoutError};
use tracing::debug;

use utkik_core::TransportProtocol;

use crate::packet::{DissectedPacket, DnsLayer, HttpLayer, NetworkLayer, TlsLayer, TransportLayer};
use crate::source::{PacketBatch, PacketSource, SourceError, SourceFactory};

/// Field selectors passed to `tshark -e`, in output column order.
const EXTRACT_FIELDS: &[&str] = &[
    "frame.time_epoch",
    "frame.protocols",
    "ip.src",
    "ip.dst",
    "ipv6.src",
    "ipv6.dst",
    "tcp.srcport",
    "tcp.dstport",
    "udp.srcport",
    "udp.dstport",
    "http.request.full_uri",
    "http.host",
    "http.request.uri",
    "tls.handshake.extensions_server_name",
    "dns.qry.name",
];

/// Lines buffered between the reader thread and `poll`. The reader blocks
/// once the channel is full, which backpressures the child through its
/// stdout pipe.
const LINE_BUFFER: usize = 1024;

/// A running `tshark` process plus the thread that drains its stdout.
pub struct TsharkSource {
    child: Child,
    lines: Receiver<String>,
    reader: Option<JoinHandle<()>>,
    batch_size: usize,
}

impl TsharkSource {
    /// Spawns `tshark` on `interface` with `display_filter` and starts the
    /// reader thread.
    pub fn open(
        interface: &str,
        display_filter: &str,
        batch_size: usize,
    ) -> Result<Self, SourceError> {
        let mut cmd = Command::new("tshark");
        cmd.args(["-l", "-n", "-q", "-i", interface, "-Y", display_filter]);
        cmd.args(["-T", "fields"]);
        for field in EXTRACT_FIELDS {
            cmd.args(["-e", field]);
        }
        cmd.args(["-E", "separator=/t", "-E", "occurrence=f"]);
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null());

        let child = cmd.spawn()?;
        debug!(interface, display_filter, "tshark source opened");
        Self::wire(child, batch_size)
    }

    /// Wires the line channel and reader thread onto a spawned dissector
    /// process.
    fn wire(mut child: Child, batch_size: usize) -> Result<Self, SourceError> {
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| std::io::Error::other("tshark stdout was not captured"))?;

        let (tx, rx) = channel::bounded(LINE_BUFFER);
        let reader = thread::Builder::new()
            .name("tshark-reader".into())
            .spawn(move || {
                let mut lines = BufReader::new(stdout).lines();
                while let Some(Ok(line)) = lines.next() {
                    if tx.send(line).is_err() {
                        break;
                    }
                }
            })?;

        Ok(Self {
            child,
            lines: rx,
            reader: Some(reader),
            batch_size,
        })
    }
}

impl PacketSource for TsharkSource {
    fn poll(&mut self, timeout: Duration) -> Result<PacketBatch, SourceError> {
        let mut batch = PacketBatch::default();

        let first = match self.lines.recv_timeout(timeout) {
            Ok(line) => line,
            Err(RecvTimeoutError::Timeout) => return Ok(batch),
            Err(RecvTimeoutError::Disconnected) => return Err(SourceError::Exhausted),
        };

        for line in std::iter::once(first).chain(self.lines.try_iter()) {
            let line = line.trim_end_matches('\r');
            if line.is_empty() {
                continue;
            }
            match decode_fields_line(line) {
                Some(packet) => batch.packets.push(packet),
                None => batch.malformed += 1,
            }
            if batch.packets.len() >= self.batch_size {
                break;
            }
        }
        Ok(batch)
    }
}

impl Drop for TsharkSource {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
        // A reader blocked in `send` on a full channel only returns once
        // every receiver is gone, so disconnect before joining.
        let (_, disconnected) = channel::bounded(0);
        drop(std::mem::replace(&mut self.lines, disconnected));
        if let Some(handle) = self.reader.take() {
            let _ = handle.join();
        }
    }
}

/// Opens a fresh [`TsharkSource`] per capture session.
#[derive(Clone, Debug)]
pub struct TsharkSourceFactory {
    batch_size: usize,
}

impl TsharkSourceFactory {
    pub fn new(batch_size: usize) -> Self {
        Self { batch_size }
    }
}

impl SourceFactory for TsharkSourceFactory {
    fn open(
        &self,
        interface: &str,
        display_filter: &str,
    ) -> Result<Box<dyn PacketSource>, SourceError> {
        Ok(Box::new(TsharkSource::open(
            interface,
            display_filter,
            self.batch_size,
        )?))
    }
}

/// Decodes one `-T fields` output line. `None` means the line did not
/// match the selector layout and should be counted as malformed.
fn decode_fields_line(line: &str) -> Option<DissectedPacket> {
    let fields: Vec<&str> = line.split('\t').collect();
    if fields.len() != EXTRACT_FIELDS.len() {
        return None;
    }

    let sniff_time = parse_epoch(fields[0])?;
    let protocols: Vec<&str> = fields[1].split(':').collect();

    let mut packet = DissectedPacket::new(sniff_time);
    packet.network = decode_network(&fields)?;
    packet.transport = decode_transport(&fields)?;

    if protocols.contains(&"http") {
        packet.http = Some(HttpLayer {
            request_full_uri: present(fields[10]).map(str::to_string),
            host: present(fields[11]).map(str::to_string),
            request_uri: present(fields[12]).map(str::to_string),
        });
    }
    // Older dissectors label the layer "ssl".
    if protocols.contains(&"tls") || protocols.contains(&"ssl") {
        packet.tls = Some(TlsLayer {
            server_name: present(fields[13]).map(str::to_string),
        });
    }
    if protocols.contains(&"dns") {
        packet.dns = Some(DnsLayer {
            query_name: present(fields[14]).map(str::to_string),
        });
    }

    Some(packet)
}

fn present(raw: &str) -> Option<&str> {
    if raw.is_empty() {
        None
    } else {
        Some(raw)
    }
}

fn parse_epoch(raw: &str) -> Option<DateTime<Utc>> {
    let epoch: f64 = raw.parse().ok()?;
    let mut secs = epoch.trunc() as i64;
    let mut nanos = (epoch.fract() * 1e9).round() as u32;
    if nanos >= 1_000_000_000 {
        secs += 1;
        nanos = 0;
    }
    DateTime::from_timestamp(secs, nanos)
}

fn decode_network(fields: &[&str]) -> Option<Option<NetworkLayer>> {
    let pair = match (present(fields[2]), present(fields[3])) {
        (Some(src), Some(dst)) => Some((src, dst)),
        _ => match (present(fields[4]), present(fields[5])) {
            (Some(src), Some(dst)) => Some((src, dst)),
            _ => None,
        },
    };
    match pair {
        Some((src, dst)) => Some(Some(NetworkLayer {
            src: src.parse().ok()?,
            dst: dst.parse().ok()?,
        })),
        None => Some(None),
    }
}

fn decode_transport(fields: &[&str]) -> Option<Option<TransportLayer>> {
    let (protocol, src, dst) = match (present(fields[6]), present(fields[7])) {
        (Some(src), Some(dst)) => (TransportProtocol::Tcp, src, dst),
        _ => match (present(fields[8]), present(fields[9])) {
            (Some(src), Some(dst)) => (TransportProtocol::Udp, src, dst),
            _ => return Some(None),
        },
    };
    Some(Some(TransportLayer {
        protocol,
        src_port: src.parse().ok()?,
        dst_port: dst.parse().ok()?,
    }))
}
