//! Artifact entity
//!
//! Represents a validated candidate that has been assigned a sequence
//! number and a name and is on its way to a sink.

use super::file_signature::FileType;
use serde::Serialize;
use std::borrow::Cow;
use std::path::PathBuf;

/// A carved file ready to be persisted
///
/// The bytes are normally borrowed straight out of the payload buffer;
/// sinks that need to keep them past the scan call [`Artifact::into_owned`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact<'a> {
    /// Global sequence number within the run
    sequence: u64,
    /// The type of file
    file_type: FileType,
    /// Offset of the first byte in the payload buffer
    source_offset: u64,
    /// The carved bytes
    data: Cow<'a, [u8]>,
    /// Suggested file name
    filename: String,
}

impl<'a> Artifact<'a> {
    /// Creates an artifact borrowing its bytes from the payload
    pub fn new(
        sequence: u64,
        file_type: FileType,
        source_offset: u64,
        data: &'a [u8],
        filename: String,
    ) -> Self {
        Self {
            sequence,
            file_type,
            source_offset,
            data: Cow::Borrowed(data),
            filename,
        }
    }

    /// Returns the run-wide sequence number
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Returns the file type
    pub fn file_type(&self) -> FileType {
        self.file_type
    }

    /// Returns the short type identifier
    pub fn type_id(&self) -> &'static str {
        self.file_type.id()
    }

    /// Returns the offset in the payload buffer
    pub fn source_offset(&self) -> u64 {
        self.source_offset
    }

    /// Returns the carved bytes
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Returns the size in bytes
    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }

    /// Returns the suggested file name
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Copies the bytes out of the payload buffer
    pub fn into_owned(self) -> Artifact<'static> {
        Artifact {
            sequence: self.sequence,
            file_type: self.file_type,
            source_offset: self.source_offset,
            data: Cow::Owned(self.data.into_owned()),
            filename: self.filename,
        }
    }

    /// Returns a human-readable size string
    pub fn size_human(&self) -> String {
        const KB: u64 = 1024;
        const MB: u64 = KB * 1024;

        let size = self.size();
        if size >= MB {
            format!("{:.2} MB", size as f64 / MB as f64)
        } else if size >= KB {
            format!("{:.2} KB", size as f64 / KB as f64)
        } else {
            format!("{} bytes", size)
        }
    }
}

/// What is left of an artifact once the sink has taken its bytes
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactDescriptor {
    pub sequence: u64,
    #[serde(rename = "type")]
    pub type_id: &'static str,
    pub source_offset: u64,
    pub size: u64,
    pub filename: String,
    /// Where the sink put the bytes, if it stored them on disk
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saved_path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
}

impl ArtifactDescriptor {
    /// Byte range of the artifact in the payload buffer
    pub fn range(&self) -> std::ops::Range<u64> {
        self.source_offset..self.source_offset + self.size
    }

    /// Returns the file type this descriptor refers to
    pub fn file_type(&self) -> Option<FileType> {
        FileType::from_id(self.type_id)
    }
}
