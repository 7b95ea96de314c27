//! Chain-of-custody manifest
//!
//! One record per carved file, written as `manifest.json` beside the
//! files so each one can be traced back to its place in the payload.

use crate::domain::entities::ArtifactDescriptor;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Provenance of a single carved file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustodyRecord {
    pub filename: String,
    #[serde(rename = "type")]
    pub type_id: String,
    pub sequence: u64,
    /// Offset in the payload, as `0x` followed by 16 upper-case hex digits
    pub offset_hex: String,
    pub offset: u64,
    pub length: u64,
    pub sha256: String,
}

impl CustodyRecord {
    /// Builds a record, hashing `payload` over the artifact's range when the
    /// sink did not already compute a digest
    pub fn from_descriptor(descriptor: &ArtifactDescriptor, payload: &[u8]) -> Self {
        let sha256 = match &descriptor.sha256 {
            Some(digest) => digest.clone(),
            None => {
                let start = descriptor.source_offset as usize;
                let end = start + descriptor.size as usize;
                hex::encode(Sha256::digest(&payload[start..end]))
            }
        };

        Self {
            filename: descriptor.filename.clone(),
            type_id: descriptor.type_id.to_string(),
            sequence: descriptor.sequence,
            offset_hex: format!("0x{:016X}", descriptor.source_offset),
            offset: descriptor.source_offset,
            length: descriptor.size,
            sha256,
        }
    }
}

/// Everything carved in one run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunManifest {
    /// RFC 3339 time the manifest was produced
    pub generated_at: String,
    pub capture: String,
    pub payload_bytes: u64,
    pub selection: Vec<String>,
    pub interrupted: bool,
    pub artifacts: Vec<CustodyRecord>,
}

impl RunManifest {
    pub fn new(capture: String, payload_bytes: u64, selection: Vec<String>) -> Self {
        Self::at(Utc::now(), capture, payload_bytes, selection)
    }

    /// Creates a manifest stamped with a fixed time
    pub fn at(
        generated_at: DateTime<Utc>,
        capture: String,
        payload_bytes: u64,
        selection: Vec<String>,
    ) -> Self {
        Self {
            generated_at: generated_at.to_rfc3339_opts(SecondsFormat::Secs, true),
            capture,
            payload_bytes,
            selection,
            interrupted: false,
            artifacts: Vec::new(),
        }
    }

    pub fn push(&mut self, record: CustodyRecord) {
        self.artifacts.push(record);
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
