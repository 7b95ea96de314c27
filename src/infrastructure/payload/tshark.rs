//! Tshark payload source
//!
//! Runs `tshark` over a capture file and concatenates the hex-encoded
//! transport payload of every matching packet, in capture order.
//!
//! The tool is spawned with an argument vector, never through a shell, so
//! the capture path cannot inject commands.

use crate::domain::repositories::{PayloadError, PayloadSource};
use bytes::{BufMut, Bytes, BytesMut};
use std::io;
use std::path::Path;
use std::process::Command;
use tracing::{debug, info};

/// How to invoke tshark
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TsharkConfig {
    /// Program name or path
    pub program: String,
    /// Display filter selecting the packets that carry payload
    pub display_filter: String,
    /// Field printed for each packet (hex bytes)
    pub field: String,
}

impl Default for TsharkConfig {
    fn default() -> Self {
        Self {
            program: "tshark".to_string(),
            display_filter: "tcp.payload".to_string(),
            field: "tcp.payload".to_string(),
        }
    }
}

impl TsharkConfig {
    /// Uses a specific tshark binary
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Builds the argument vector for a capture
    pub fn args(&self, capture: &Path) -> Vec<std::ffi::OsString> {
        vec![
            "-r".into(),
            capture.as_os_str().to_os_string(),
            "-Y".into(),
            self.display_filter.clone().into(),
            "-T".into(),
            "fields".into(),
            "-e".into(),
            self.field.clone().into(),
        ]
    }
}

/// Payload source backed by the tshark command line tool
#[derive(Debug, Clone, Default)]
pub struct TsharkPayloadSource {
    config: TsharkConfig,
}

impl TsharkPayloadSource {
    pub fn new(config: TsharkConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TsharkConfig {
        &self.config
    }
}

impl PayloadSource for TsharkPayloadSource {
    fn load(&self, path: &Path) -> Result<Bytes, PayloadError> {
        if !path.exists() {
            return Err(PayloadError::NotFound(path.to_path_buf()));
        }

        info!(capture = %path.display(), program = %self.config.program, "Extracting payloads");

        let output = Command::new(&self.config.program)
            .args(self.config.args(path))
            .output()
            .map_err(|source| match source.kind() {
                io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied => {
                    PayloadError::ToolUnavailable {
                        program: self.config.program.clone(),
                        source,
                    }
                }
                _ => PayloadError::IoError(source),
            })?;

        if !output.status.success() {
            return Err(PayloadError::ToolFailed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let payload = decode_field_lines(&output.stdout)?;
        debug!(bytes = payload.len(), "Assembled payload");
        Ok(payload)
    }

    fn describe(&self) -> String {
        format!("{} ({})", self.config.program, self.config.field)
    }
}

/// Decodes tshark `-T fields` output into one contiguous buffer.
///
/// Each non-blank line holds the hex bytes of one packet. Bytes may be
/// separated by `:`, and a packet carrying several values prints them
/// comma separated; all of them are appended in order.
pub fn decode_field_lines(output: &[u8]) -> Result<Bytes, PayloadError> {
    let text = std::str::from_utf8(output).map_err(|e| PayloadError::MalformedOutput {
        line: 0,
        reason: e.to_string(),
    })?;

    let mut payload = BytesMut::with_capacity(text.len() / 2);
    for (index, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        for value in line.split(',').map(str::trim).filter(|v| !v.is_empty()) {
            let digits: String = value.chars().filter(|c| *c != ':').collect();
            let decoded = hex::decode(&digits).map_err(|e| PayloadError::MalformedOutput {
                line: index + 1,
                reason: e.to_string(),
            })?;
            payload.put_slice(&decoded);
        }
    }
    Ok(payload.freeze())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn concatenates_lines_in_order() {
        let payload = decode_field_lines(b"ffd8ff\n\n4141\nffd9\n").unwrap();
        assert_eq!(&payload[..], &[0xFF, 0xD8, 0xFF, 0x41, 0x41, 0xFF, 0xD9]);
    }

    #[test]
    fn accepts_colon_separated_and_multi_value_lines() {
        let payload = decode_field_lines(b"1f:8b:08,00:01\r\n").unwrap();
        assert_eq!(&payload[..], &[0x1F, 0x8B, 0x08, 0x00, 0x01]);
    }

    #[test]
    fn reports_the_offending_line() {
        let err = decode_field_lines(b"4142\nzz\n").unwrap_err();
        assert!(matches!(err, PayloadError::MalformedOutput { line: 2, .. }));
    }

    #[test]
    fn odd_length_is_malformed() {
        assert!(decode_field_lines(b"abc\n").is_err());
    }

    #[test]
    fn empty_output_is_an_empty_payload() {
        assert!(decode_field_lines(b"").unwrap().is_empty());
    }

    #[test]
    fn capture_path_is_a_single_argument() {
        let config = TsharkConfig::default();
        let args = config.args(Path::new("a b; rm -rf x.pcap"));
        assert_eq!(args.len(), 8);
        assert_eq!(args[1], "a b; rm -rf x.pcap");
        assert_eq!(args[3], "tcp.payload");
    }

    #[test]
    fn missing_capture_is_reported_before_spawning() {
        let source =
            TsharkPayloadSource::new(TsharkConfig::default().with_program("/nonexistent/tshark"));
        let err = source.load(Path::new("/nonexistent/capture.pcap")).unwrap_err();
        assert!(matches!(err, PayloadError::NotFound(_)));
    }

    #[test]
    fn missing_tool_is_unavailable() {
        let capture = tempfile::NamedTempFile::new().unwrap();
        let source =
            TsharkPayloadSource::new(TsharkConfig::default().with_program("/nonexistent/tshark"));
        let err = source.load(capture.path()).unwrap_err();
        assert!(matches!(err, PayloadError::ToolUnavailable { .. }));
    }
}
