//! Extraction report DTO

use crate::domain::entities::ScanResult;
use std::path::PathBuf;

/// Outcome of a successful extraction run
#[derive(Debug, Clone)]
pub struct ExtractionReport {
    /// Capture file the payload was assembled from
    pub capture: PathBuf,
    /// Directory the carved files went to
    pub output_dir: PathBuf,
    /// What the carving engine found
    pub scan: ScanResult,
    /// Path of the written manifest, if one was requested
    pub manifest_path: Option<PathBuf>,
}

impl ExtractionReport {
    pub fn files_extracted(&self) -> usize {
        self.scan.total_artifacts()
    }

    /// Returns a summary string
    pub fn summary(&self) -> String {
        let mut summary = format!("Capture: {}\n", self.capture.display());
        summary.push_str(&self.scan.summary());
        if self.files_extracted() > 0 {
            summary.push_str(&format!("Output directory: {}\n", self.output_dir.display()));
        }
        if let Some(path) = &self.manifest_path {
            summary.push_str(&format!("Manifest: {}\n", path.display()));
        }
        summary
    }
}
