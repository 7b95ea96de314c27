//! Artifact sink trait
//!
//! Defines the interface for handing accepted artifacts to storage or to a
//! caller.

use crate::domain::entities::Artifact;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when emitting an artifact
#[derive(Error, Debug)]
pub enum SinkError {
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("File already exists: {0}")]
    FileExists(String),

    #[error("Disk full: {0}")]
    DiskFull(String),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Artifact rejected by sink: {0}")]
    Rejected(String),
}

/// Options for the filesystem sink
#[derive(Debug, Clone)]
pub struct WriteOptions {
    /// Whether to overwrite existing files
    pub overwrite: bool,
    /// Whether to create subdirectories by file type
    pub organize_by_type: bool,
    /// Whether to flush every file to disk before returning
    pub sync: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            overwrite: true,
            organize_by_type: false,
            sync: false,
        }
    }
}

/// Result of emitting a single artifact
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteResult {
    /// Path where the artifact was saved, for sinks that store on disk
    pub saved_path: Option<PathBuf>,
    /// Size in bytes of what was stored
    pub saved_size: u64,
    /// Hex SHA-256 of the stored bytes, when the sink computes one
    pub sha256: Option<String>,
}

/// Trait for receiving carved artifacts
///
/// The carver calls [`ArtifactSink::write`] once per accepted artifact, in
/// emission order. An error aborts the run: a sink failure points at the
/// environment, not at the data.
///
/// # Example
///
/// ```ignore
/// let writer = LocalFileWriter::new("extracted_files", WriteOptions::default())?;
/// let result = engine.extract(&payload, &["jpg", "png"], &writer, None)?;
/// println!("{} files written", writer.files_written());
/// ```
pub trait ArtifactSink: Send + Sync {
    /// Emits one artifact
    fn write(&self, artifact: &Artifact<'_>) -> Result<WriteResult, SinkError>;

    /// Returns the number of artifacts accepted so far
    fn files_written(&self) -> usize;

    /// Returns the total bytes accepted so far
    fn bytes_written(&self) -> u64;
}

impl<S: ArtifactSink + ?Sized> ArtifactSink for &S {
    fn write(&self, artifact: &Artifact<'_>) -> Result<WriteResult, SinkError> {
        (**self).write(artifact)
    }

    fn files_written(&self) -> usize {
        (**self).files_written()
    }

    fn bytes_written(&self) -> u64 {
        (**self).bytes_written()
    }
}
