//! Extraction options DTO

use crate::domain::entities::FileType;
use std::path::{Path, PathBuf};

/// Default directory for carved files
pub const DEFAULT_OUTPUT_DIR: &str = "extracted_files";

/// File name of the chain-of-custody manifest
pub const MANIFEST_FILE_NAME: &str = "manifest.json";

/// Options for one extraction run
#[derive(Debug, Clone)]
pub struct ExtractionOptions {
    /// Directory that receives the carved files and the manifest
    pub output_dir: PathBuf,
    /// Type identifiers to carve, in scan order
    pub selection: Vec<String>,
    /// Whether to write `manifest.json` next to the carved files
    pub write_manifest: bool,
}

impl Default for ExtractionOptions {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            selection: Vec::new(),
            write_manifest: false,
        }
    }
}

impl ExtractionOptions {
    /// Creates options writing to the given directory
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            ..Default::default()
        }
    }

    /// Sets the type identifiers to carve
    pub fn with_selection<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.selection = ids.into_iter().map(Into::into).collect();
        self
    }

    /// Selects every known type, in catalog order
    pub fn with_all_types(mut self) -> Self {
        self.selection = FileType::ALL.iter().map(|t| t.id().to_string()).collect();
        self
    }

    /// Enables the chain-of-custody manifest
    pub fn with_manifest(mut self) -> Self {
        self.write_manifest = true;
        self
    }

    /// Returns where the manifest goes
    pub fn manifest_path(&self) -> PathBuf {
        self.output_dir.join(MANIFEST_FILE_NAME)
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }
}
