//! Extract files use case
//!
//! Assembles the payload of a capture, runs the carving engine over it and
//! optionally records a chain-of-custody manifest.

use crate::application::dto::{CustodyRecord, ExtractionOptions, ExtractionReport, RunManifest};
use crate::domain::entities::ScanProgress;
use crate::domain::repositories::{ArtifactSink, PayloadError, PayloadSource};
use crate::domain::services::{CarverError, CarvingEngine};
use std::cell::Cell;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

const ASSEMBLY_PERCENT: u8 = 10;
const ANALYSIS_PERCENT: u8 = 30;
const CARVING_CEILING: u8 = 95;

/// Errors that end an extraction run
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("Payload assembly failed: {0}")]
    Assembly(#[from] PayloadError),

    #[error(transparent)]
    Carver(#[from] CarverError),

    #[error("Failed to write manifest {}: {source}", .path.display())]
    Manifest {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Progress of an extraction run, for a progress bar or status line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    /// Work in progress; `percent` never decreases within a run
    Update { percent: u8, message: String },
    /// Last event of every run
    Finished { success: bool, message: String },
}

/// Extract files use case
///
/// Generic over where the payload comes from; the sink is chosen per run.
pub struct ExtractFilesUseCase<P: PayloadSource> {
    source: P,
    engine: CarvingEngine,
}

impl<P: PayloadSource> ExtractFilesUseCase<P> {
    /// Creates a new extract files use case
    pub fn new(source: P, engine: CarvingEngine) -> Self {
        Self { source, engine }
    }

    pub fn source(&self) -> &P {
        &self.source
    }

    pub fn engine(&self) -> &CarvingEngine {
        &self.engine
    }

    /// Executes the extraction
    ///
    /// An empty selection is rejected before the capture is touched. The
    /// final [`ProgressEvent::Finished`] is sent on success and on failure.
    pub fn execute<S: ArtifactSink + ?Sized>(
        &self,
        capture: &Path,
        options: &ExtractionOptions,
        sink: &S,
        progress: Option<&dyn Fn(&ProgressEvent)>,
    ) -> Result<ExtractionReport, ExtractError> {
        let emit = |event: ProgressEvent| {
            if let Some(callback) = progress {
                callback(&event);
            }
        };

        let outcome = self.run(capture, options, sink, &emit);
        match &outcome {
            Ok(report) => emit(ProgressEvent::Finished {
                success: !report.scan.was_interrupted(),
                message: finished_message(report),
            }),
            Err(e) => emit(ProgressEvent::Finished {
                success: false,
                message: format!("Extraction failed: {e}"),
            }),
        }
        outcome
    }

    fn run<S: ArtifactSink + ?Sized>(
        &self,
        capture: &Path,
        options: &ExtractionOptions,
        sink: &S,
        emit: &dyn Fn(ProgressEvent),
    ) -> Result<ExtractionReport, ExtractError> {
        if options.selection.is_empty() {
            return Err(CarverError::NoTypesSelected.into());
        }

        emit(ProgressEvent::Update {
            percent: ASSEMBLY_PERCENT,
            message: "Extracting network payloads...".to_string(),
        });
        info!(capture = %capture.display(), source = %self.source.describe(), "Assembling payload");
        let payload = self.source.load(capture)?;

        emit(ProgressEvent::Update {
            percent: ANALYSIS_PERCENT,
            message: "Analyzing payload content...".to_string(),
        });

        let last_percent = Cell::new(ANALYSIS_PERCENT);
        let on_scan = |scan: &ScanProgress| {
            let percent = carving_percent(scan.percentage());
            if percent <= last_percent.get() {
                return;
            }
            last_percent.set(percent);
            let message = match scan.last_type {
                Some(file_type) => format!(
                    "Extracted {} files (latest: {})",
                    scan.artifacts_found,
                    file_type.id().to_uppercase()
                ),
                None => "Analyzing payload content...".to_string(),
            };
            emit(ProgressEvent::Update { percent, message });
        };

        let scan = self
            .engine
            .extract(&payload, &options.selection, sink, Some(&on_scan))?;

        let manifest_path = if options.write_manifest {
            let path = options.manifest_path();
            let mut manifest = RunManifest::new(
                capture.display().to_string(),
                scan.payload_bytes(),
                options.selection.clone(),
            );
            manifest.interrupted = scan.was_interrupted();
            for descriptor in scan.artifacts() {
                manifest.push(CustodyRecord::from_descriptor(descriptor, &payload));
            }
            write_manifest(&path, &manifest)?;
            info!(path = %path.display(), records = manifest.artifacts.len(), "Manifest written");
            Some(path)
        } else {
            None
        };

        if scan.was_interrupted() {
            warn!(artifacts = scan.total_artifacts(), "Extraction interrupted");
        }

        Ok(ExtractionReport {
            capture: capture.to_path_buf(),
            output_dir: options.output_dir.clone(),
            scan,
            manifest_path,
        })
    }
}

/// Maps engine progress (0-100) onto the carving band of the run
fn carving_percent(engine_percent: f64) -> u8 {
    let band = f64::from(CARVING_CEILING - ANALYSIS_PERCENT);
    let mapped = f64::from(ANALYSIS_PERCENT) + engine_percent.clamp(0.0, 100.0) * band / 100.0;
    (mapped as u8).min(CARVING_CEILING)
}

fn finished_message(report: &ExtractionReport) -> String {
    let found = report.files_extracted();
    if report.scan.was_interrupted() {
        format!("Extraction interrupted after {found} files")
    } else if found == 0 {
        "No matching files found in payload".to_string()
    } else {
        let dir =
            fs::canonicalize(&report.output_dir).unwrap_or_else(|_| report.output_dir.clone());
        format!("Success! Extracted {found} files to:\n{}", dir.display())
    }
}

fn write_manifest(path: &Path, manifest: &RunManifest) -> Result<(), ExtractError> {
    let wrap = |source: std::io::Error| ExtractError::Manifest {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(wrap)?;
    }
    let json = manifest.to_json().map_err(|e| wrap(e.into()))?;
    fs::write(path, json).map_err(wrap)
}
