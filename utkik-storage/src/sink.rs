//! The record sink.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde_json::Value;
use tracing::debug;

use utkik_core::{ClassifiedRecord, SessionMarker, SuspiciousRecord};

use crate::error::StorageError;

/// Writes classified records, suspicious entries and diagnostics to three
/// append-only files.
///
/// Each session starts with [`RecordSink::initialize`], which truncates the
/// two JSON-Lines logs and stamps a `capture_start` marker into both, and
/// ends with [`RecordSink::finalize`], which appends a `capture_end` marker
/// to the primary log. The diagnostic log is never truncated.
#[derive(Clone, Debug)]
pub struct RecordSink {
    primary: PathBuf,
    suspicious: PathBuf,
    diagnostics: PathBuf,
}

impl RecordSink {
    pub fn new(primary: PathBuf, suspicious: PathBuf, diagnostics: PathBuf) -> Self {
        Self {
            primary,
            suspicious,
            diagnostics,
        }
    }

    /// Truncates both JSON-Lines logs and writes a `capture_start` marker
    /// into each.
    pub fn initialize(&self) -> Result<(), StorageError> {
        let marker = serde_json::to_string(&SessionMarker::start_now())?;
        for path in [&self.primary, &self.suspicious] {
            let mut file = OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(true)
                .open(path)
                .map_err(|source| StorageError::Write {
                    path: path.clone(),
                    source,
                })?;
            file.write_all(format!("{marker}\n").as_bytes())
                .map_err(|source| StorageError::Write {
                    path: path.clone(),
                    source,
                })?;
        }
        debug!(primary = %self.primary.display(), "session logs initialized");
        Ok(())
    }

    /// Appends a `capture_end` marker to the primary log.
    pub fn finalize(&self) -> Result<(), StorageError> {
        let marker = serde_json::to_string(&SessionMarker::end_now())?;
        self.append_line(&self.primary, &marker)
    }

    /// Appends a classified record to the primary log, unless it carries no
    /// identity at all. Returns whether the record was written.
    pub fn append(&self, record: &ClassifiedRecord) -> Result<bool, StorageError> {
        if !record.has_identity() {
            return Ok(false);
        }
        let line = serde_json::to_string(record)?;
        self.append_line(&self.primary, &line)?;
        Ok(true)
    }

    /// Appends a suspicious entry. Suspicious records are kept even when
    /// they carry no identity, so the identity filter does not apply here.
    pub fn append_suspicious(&self, record: &SuspiciousRecord) -> Result<(), StorageError> {
        let line = serde_json::to_string(record)?;
        self.append_line(&self.suspicious, &line)
    }

    /// Appends a timestamped line to the diagnostic log.
    pub fn append_diagnostic(&self, message: &str) -> Result<(), StorageError> {
        let line = format!("[{}] {message}", Utc::now().to_rfc3339());
        self.append_line(&self.diagnostics, &line)
    }

    /// Reads back every primary-log object that carries a `url` key.
    /// Session markers never do, so they are filtered out here, as are
    /// lines that do not parse (a partially written trailing line, say).
    pub fn urls(&self) -> Result<Vec<Value>, StorageError> {
        Ok(self
            .read_objects(&self.primary)?
            .into_iter()
            .filter(|value| value.get("url").is_some())
            .collect())
    }

    /// Reads back every suspicious-log object flagged `suspicious: true`.
    pub fn suspicious_connections(&self) -> Result<Vec<Value>, StorageError> {
        Ok(self
            .read_objects(&self.suspicious)?
            .into_iter()
            .filter(|value| value.get("suspicious").and_then(Value::as_bool) == Some(true))
            .collect())
    }

    fn read_objects(&self, path: &Path) -> Result<Vec<Value>, StorageError> {
        let raw = fs::read_to_string(path).map_err(|source| StorageError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(raw
            .lines()
            .filter_map(|line| serde_json::from_str::<Value>(line).ok())
            .collect())
    }

    fn append_line(&self, path: &Path, line: &str) -> Result<(), StorageError> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|source| StorageError::Write {
                path: path.to_path_buf(),
                source,
            })?;
        // One write per line keeps concurrent appends whole.
        file.write_all(format!("{line}\n").as_bytes())
            .map_err(|source| StorageError::Write {
                path: path.to_path_buf(),
                source,
            })
    }
}

#[cfg(test)]
mod tests {
    use chrono::DateTime;
    use tempfile::TempDir;

    use utkik_core::TransportProtocol;

    use super::*;

    fn sink(dir: &TempDir) -> RecordSink {
        RecordSink::new(
            dir.path().join("network_urls.jsonl"),
            dir.path().join("suspicious_connections.jsonl"),
            dir.path().join("capture_debug.log"),
        )
    }

    fn record_with_url(url: &str) -> ClassifiedRecord {
        let mut record = ClassifiedRecord::new(
            DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
            Some(TransportProtocol::Tcp),
        );
        record.url = Some(url.to_string());
        record
    }

    #[test]
    fn initialize_truncates_and_stamps_both_logs() {
        let dir = TempDir::new().unwrap();
        let sink = sink(&dir);

        fs::write(dir.path().join("network_urls.jsonl"), "stale\n").unwrap();
        sink.initialize().unwrap();

        for name in ["network_urls.jsonl", "suspicious_connections.jsonl"] {
            let content = fs::read_to_string(dir.path().join(name)).unwrap();
            assert_eq!(content.lines().count(), 1, "{name}");
            assert!(content.contains("\"event\":\"capture_start\""), "{name}");
            assert!(!content.contains("stale"));
        }
    }

    #[test]
    fn append_skips_records_without_identity() {
        let dir = TempDir::new().unwrap();
        let sink = sink(&dir);
        sink.initialize().unwrap();

        let empty = ClassifiedRecord::new(
            DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
            Some(TransportProtocol::Tcp),
        );
        assert!(!sink.append(&empty).unwrap());
        assert!(sink.append(&record_with_url("http://example.com/")).unwrap());

        let content = fs::read_to_string(dir.path().join("network_urls.jsonl")).unwrap();
        assert_eq!(content.lines().count(), 2);
    }

    #[test]
    fn suspicious_append_keeps_identityless_records() {
        let dir = TempDir::new().unwrap();
        let sink = sink(&dir);
        sink.initialize().unwrap();

        let mut record = ClassifiedRecord::new(
            DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
            Some(TransportProtocol::Tcp),
        );
        record.dst_port = Some(4444);
        record.flag(vec!["Connection to suspicious port Metasploit".into()]);
        assert!(!record.has_identity());

        sink.append_suspicious(&SuspiciousRecord::new(record)).unwrap();

        let found = sink.suspicious_connections().unwrap();
        assert_eq!(found.len(), 1);
        assert!(found[0].get("detected_at").is_some());
    }

    #[test]
    fn finalize_marks_primary_log_only() {
        let dir = TempDir::new().unwrap();
        let sink = sink(&dir);
        sink.initialize().unwrap();
        sink.finalize().unwrap();

        let primary = fs::read_to_string(dir.path().join("network_urls.jsonl")).unwrap();
        assert!(primary.contains("\"event\":\"capture_end\""));

        let suspicious =
            fs::read_to_string(dir.path().join("suspicious_connections.jsonl")).unwrap();
        assert!(!suspicious.contains("capture_end"));
    }

    #[test]
    fn urls_skips_markers_and_unparseable_lines() {
        let dir = TempDir::new().unwrap();
        let sink = sink(&dir);
        sink.initialize().unwrap();
        sink.append(&record_with_url("http://example.com/")).unwrap();
        sink.append(&record_with_url("https://bank.example/")).unwrap();

        // Simulate a crash mid-append.
        let mut file = OpenOptions::new()
            .append(true)
            .open(dir.path().join("network_urls.jsonl"))
            .unwrap();
        file.write_all(b"{\"url\": \"htt").unwrap();

        let urls = sink.urls().unwrap();
        assert_eq!(urls.len(), 2);
        assert_eq!(urls[0]["url"], "http://example.com/");
    }

    #[test]
    fn suspicious_connections_require_the_flag() {
        let dir = TempDir::new().unwrap();
        let sink = sink(&dir);
        sink.initialize().unwrap();

        let mut flagged = record_with_url("http://evil.test/login");
        flagged.flag(vec!["Insecure HTTP connection".into()]);
        sink.append_suspicious(&SuspiciousRecord::new(flagged)).unwrap();

        let found = sink.suspicious_connections().unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0]["suspicious"], true);
    }

    #[test]
    fn reading_a_missing_log_is_an_error() {
        let dir = TempDir::new().unwrap();
        let sink = sink(&dir);
        assert!(matches!(sink.urls(), Err(StorageError::Read { .. })));
    }

    #[test]
    fn diagnostics_carry_a_timestamp_prefix_and_accumulate() {
        let dir = TempDir::new().unwrap();
        let sink = sink(&dir);

        sink.append_diagnostic("Starting capture on interface: eth0").unwrap();
        sink.initialize().unwrap();
        sink.append_diagnostic("Stopping capture").unwrap();

        let content = fs::read_to_string(dir.path().join("capture_debug.log")).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with('['));
        assert!(lines[0].ends_with("Starting capture on interface: eth0"));
        assert!(lines[1].contains("] Stopping capture"));
    }
}
