//! Payload source trait
//!
//! Defines the interface for obtaining the contiguous byte buffer that the
//! carver scans. Packet parsing and stream reassembly live behind this
//! trait; the domain only ever sees the resulting bytes.

use bytes::Bytes;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while assembling a payload buffer
#[derive(Error, Debug)]
pub enum PayloadError {
    #[error("Capture not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Permission denied: {}", .0.display())]
    PermissionDenied(PathBuf),

    #[error("Payload tool '{program}' is not available: {source}")]
    ToolUnavailable {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("Payload tool exited with {status}: {stderr}")]
    ToolFailed { status: String, stderr: String },

    #[error("Malformed payload output on line {line}: {reason}")]
    MalformedOutput { line: usize, reason: String },

    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),
}

impl PayloadError {
    /// Maps an I/O error raised while opening `path` to the closest variant
    pub fn from_io(path: &Path, error: io::Error) -> Self {
        match error.kind() {
            io::ErrorKind::NotFound => PayloadError::NotFound(path.to_path_buf()),
            io::ErrorKind::PermissionDenied => PayloadError::PermissionDenied(path.to_path_buf()),
            _ => PayloadError::IoError(error),
        }
    }
}

/// Trait for producing the payload buffer from a capture
///
/// The contract is deliberately small: deliver one contiguous byte
/// sequence, in capture order, or fail with a descriptive error.
///
/// # Example
///
/// ```ignore
/// let source = TsharkPayloadSource::default();
/// let payload = source.load(Path::new("traffic.pcap"))?;
/// println!("{} payload bytes", payload.len());
/// ```
pub trait PayloadSource: Send + Sync {
    /// Assembles the payload buffer for the capture at `path`
    fn load(&self, path: &Path) -> Result<Bytes, PayloadError>;

    /// Short description used in log lines
    fn describe(&self) -> String;
}

impl<P: PayloadSource + ?Sized> PayloadSource for Box<P> {
    fn load(&self, path: &Path) -> Result<Bytes, PayloadError> {
        (**self).load(path)
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}
