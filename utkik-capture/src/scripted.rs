//! Scripted packet source for tests and offline replay.

use std::collections::VecDeque;
use std::path::Path;
use std::thread;
use std::time::Duration;

use crate::packet::DissectedPacket;
use crate::source::{PacketBatch, PacketSource, SourceError, SourceFactory};

/// Replays a fixed sequence of dissected packets.
///
/// Each poll drains the whole remaining queue. Once empty the source
/// reports [`SourceError::Exhausted`], unless `keep_open` is set, in which
/// case it sleeps out the poll timeout and returns empty batches forever.
pub struct ScriptedSource {
    queue: VecDeque<DissectedPacket>,
    keep_open: bool,
}

impl ScriptedSource {
    pub fn new(packets: Vec<DissectedPacket>) -> Self {
        Self {
            queue: packets.into(),
            keep_open: false,
        }
    }

    /// Keeps the source alive after the queue drains, turning further polls
    /// into quiet intervals instead of exhaustion.
    pub fn keep_open(mut self, keep_open: bool) -> Self {
        self.keep_open = keep_open;
        self
    }

    /// Loads a YAML scenario: a list of dissected packets in capture order.
    pub fn from_scenario_file(path: &Path) -> Result<Self, SourceError> {
        let raw = std::fs::read_to_string(path)?;
        let packets: Vec<DissectedPacket> = serde_yaml::from_str(&raw)?;
        Ok(Self::new(packets))
    }
}

impl PacketSource for ScriptedSource {
    fn poll(&mut self, timeout: Duration) -> Result<PacketBatch, SourceError> {
        if self.queue.is_empty() {
            if self.keep_open {
                thread::sleep(timeout);
                return Ok(PacketBatch::default());
            }
            return Err(SourceError::Exhausted);
        }
        Ok(PacketBatch {
            packets: self.queue.drain(..).collect(),
            malformed: 0,
        })
    }
}

/// Hands each session a fresh copy of the scripted sequence.
#[derive(Clone, Debug, Default)]
pub struct ScriptedSourceFactory {
    packets: Vec<DissectedPacket>,
    keep_open: bool,
}

impl ScriptedSourceFactory {
    pub fn new(packets: Vec<DissectedPacket>) -> Self {
        Self {
            packets,
            keep_open: false,
        }
    }

    /// Loads the replayed sequence from a YAML scenario file.
    pub fn from_scenario_file(path: &Path) -> Result<Self, SourceError> {
        let raw = std::fs::read_to_string(path)?;
        let packets: Vec<DissectedPacket> = serde_yaml::from_str(&raw)?;
        Ok(Self::new(packets))
    }

    pub fn keep_open(mut self, keep_open: bool) -> Self {
        self.keep_open = keep_open;
        self
    }
}

impl SourceFactory for ScriptedSourceFactory {
    fn open(
        &self,
        _interface: &str,
        _display_filter: &str,
    ) -> Result<Box<dyn PacketSource>, SourceError> {
        Ok(Box::new(
            ScriptedSource::new(self.packets.clone()).keep_open(self.keep_open),
        ))
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use chrono::DateTime;

    use utkik_core::TransportProtocol;

    use super::*;

    fn packet(dst_port: u16) -> DissectedPacket {
        DissectedPacket::new(DateTime::from_timestamp(1_700_000_000, 0).unwrap())
            .with_transport(TransportProtocol::Tcp, 49152, dst_port)
    }

    #[test]
    fn drains_queue_then_exhausts() {
        let mut source = ScriptedSource::new(vec![packet(80), packet(443)]);

        let batch = source.poll(Duration::from_millis(1)).unwrap();
        assert_eq!(batch.packets.len(), 2);
        assert_eq!(batch.malformed, 0);

        assert!(matches!(
            source.poll(Duration::from_millis(1)),
            Err(SourceError::Exhausted)
        ));
    }

    #[test]
    fn keep_open_turns_exhaustion_into_quiet_polls() {
        let mut source = ScriptedSource::new(vec![packet(80)]).keep_open(true);

        source.poll(Duration::from_millis(1)).unwrap();
        let quiet = source.poll(Duration::from_millis(1)).unwrap();
        assert!(quiet.is_empty());
    }

    #[test]
    fn loads_scenario_from_yaml_file() {
        let yaml = serde_yaml::to_string(&vec![packet(4444)]).unwrap();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(yaml.as_bytes()).unwrap();

        let mut source = ScriptedSource::from_scenario_file(file.path()).unwrap();
        let batch = source.poll(Duration::from_millis(1)).unwrap();
        assert_eq!(batch.packets[0].transport.as_ref().unwrap().dst_port, 4444);
    }

    #[test]
    fn factory_hands_out_fresh_copies() {
        let factory = ScriptedSourceFactory::new(vec![packet(80)]);

        for _ in 0..2 {
            let mut source = factory.open("eth0", "http or tls or dns").unwrap();
            let batch = source.poll(Duration::from_millis(1)).unwrap();
            assert_eq!(batch.packets.len(), 1);
        }
    }
}
