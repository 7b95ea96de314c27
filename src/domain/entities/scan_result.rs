//! Scan result entity
//!
//! Represents the outcome of one carving run over a payload buffer.

use super::artifact::ArtifactDescriptor;
use super::file_signature::FileType;
use serde::Serialize;
use std::time::Duration;

/// Progress information during a scan
///
/// `scanned_bytes` counts every selected type's pass over the buffer, so a
/// run over `n` types of a `len`-byte buffer ends at `n * len`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanProgress {
    /// Total bytes to scan across all selected types
    pub total_bytes: u64,
    /// Bytes scanned so far
    pub scanned_bytes: u64,
    /// Number of artifacts emitted so far
    pub artifacts_found: usize,
    /// Type of the last emitted artifact
    pub last_type: Option<FileType>,
}

impl ScanProgress {
    /// Creates a new scan progress
    pub fn new(total_bytes: u64) -> Self {
        Self {
            total_bytes,
            scanned_bytes: 0,
            artifacts_found: 0,
            last_type: None,
        }
    }

    /// Returns the progress percentage (0.0 - 100.0)
    pub fn percentage(&self) -> f64 {
        if self.total_bytes == 0 {
            return 100.0;
        }
        (self.scanned_bytes.min(self.total_bytes) as f64 / self.total_bytes as f64) * 100.0
    }

    /// Moves the position forward; positions behind the current one are ignored
    pub fn advance_to(&mut self, scanned_bytes: u64) {
        self.scanned_bytes = self.scanned_bytes.max(scanned_bytes);
    }
}

/// Result of a complete carving run
#[derive(Debug, Clone, Serialize)]
pub struct ScanResult {
    /// Size of the payload buffer
    payload_bytes: u64,
    /// Duration of the scan
    #[serde(serialize_with = "serialize_secs")]
    duration: Duration,
    /// Every emitted artifact, in emission order
    artifacts: Vec<ArtifactDescriptor>,
    /// Emitted artifacts per scanned type, in selection order
    #[serde(serialize_with = "serialize_type_counts")]
    type_counts: Vec<(FileType, usize)>,
    /// Selected identifiers the catalog does not know
    unknown_types: Vec<String>,
    /// Whether the run was cancelled before every type was scanned
    interrupted: bool,
}

impl ScanResult {
    /// Creates an empty result for a buffer of the given size
    pub fn new(payload_bytes: u64) -> Self {
        Self {
            payload_bytes,
            duration: Duration::ZERO,
            artifacts: Vec::new(),
            type_counts: Vec::new(),
            unknown_types: Vec::new(),
            interrupted: false,
        }
    }

    /// Registers a type that is about to be scanned, with a zero count
    pub fn add_type(&mut self, file_type: FileType) {
        if !self.type_counts.iter().any(|(t, _)| *t == file_type) {
            self.type_counts.push((file_type, 0));
        }
    }

    /// Adds an emitted artifact to the result
    pub fn add_artifact(&mut self, file_type: FileType, descriptor: ArtifactDescriptor) {
        match self.type_counts.iter_mut().find(|(t, _)| *t == file_type) {
            Some((_, count)) => *count += 1,
            None => self.type_counts.push((file_type, 1)),
        }
        self.artifacts.push(descriptor);
    }

    /// Records a selected identifier that the catalog does not know
    pub fn add_unknown_type(&mut self, id: &str) {
        self.unknown_types.push(id.to_string());
    }

    pub fn set_duration(&mut self, duration: Duration) {
        self.duration = duration;
    }

    pub fn mark_interrupted(&mut self) {
        self.interrupted = true;
    }

    /// Returns the payload size
    pub fn payload_bytes(&self) -> u64 {
        self.payload_bytes
    }

    /// Returns the scan duration
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Returns all emitted artifacts
    pub fn artifacts(&self) -> &[ArtifactDescriptor] {
        &self.artifacts
    }

    /// Consumes self and returns the artifacts
    pub fn into_artifacts(self) -> Vec<ArtifactDescriptor> {
        self.artifacts
    }

    /// Returns total number of emitted artifacts
    pub fn total_artifacts(&self) -> usize {
        self.artifacts.len()
    }

    /// Returns the count for a specific file type
    pub fn count_for_type(&self, file_type: FileType) -> usize {
        self.type_counts
            .iter()
            .find(|(t, _)| *t == file_type)
            .map(|(_, count)| *count)
            .unwrap_or(0)
    }

    /// Returns the per-type counts in selection order
    pub fn type_counts(&self) -> &[(FileType, usize)] {
        &self.type_counts
    }

    /// Returns selected identifiers that were skipped as unknown
    pub fn unknown_types(&self) -> &[String] {
        &self.unknown_types
    }

    /// Returns whether the run was cancelled part way
    pub fn was_interrupted(&self) -> bool {
        self.interrupted
    }

    /// Returns a summary string
    pub fn summary(&self) -> String {
        let mut summary = format!(
            "Carved {} bytes of payload in {:.2}s\n",
            self.payload_bytes,
            self.duration.as_secs_f64()
        );
        summary.push_str(&format!("Extracted {} files:\n", self.total_artifacts()));

        for (file_type, count) in &self.type_counts {
            summary.push_str(&format!("  - {}: {}\n", file_type.id().to_uppercase(), count));
        }

        if !self.unknown_types.is_empty() {
            summary.push_str(&format!(
                "Skipped unknown types: {}\n",
                self.unknown_types.join(", ")
            ));
        }

        if self.interrupted {
            summary.push_str("Scan was interrupted before completion\n");
        }

        summary
    }
}

fn serialize_secs<S: serde::Serializer>(duration: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_f64(duration.as_secs_f64())
}

fn serialize_type_counts<S: serde::Serializer>(
    counts: &[(FileType, usize)],
    s: S,
) -> Result<S::Ok, S::Error> {
    use serde::ser::SerializeMap;

    let mut map = s.serialize_map(Some(counts.len()))?;
    for (file_type, count) in counts {
        map.serialize_entry(file_type.id(), count)?;
    }
    map.end()
}
