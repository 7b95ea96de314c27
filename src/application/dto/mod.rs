//! Data Transfer Objects

mod extraction_options;
mod extraction_report;
mod manifest;

pub use extraction_options::{DEFAULT_OUTPUT_DIR, ExtractionOptions, MANIFEST_FILE_NAME};
pub use extraction_report::ExtractionReport;
pub use manifest::{CustodyRecord, RunManifest};
