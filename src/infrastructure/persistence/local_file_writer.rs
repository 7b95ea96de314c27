//! Local file writer implementation
//!
//! Writes carved artifacts to a directory on the local filesystem under
//! their suggested names.

use crate::domain::entities::Artifact;
use crate::domain::repositories::{ArtifactSink, SinkError, WriteOptions, WriteResult};
use sha2::{Digest, Sha256};
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// Local file system writer
///
/// Creates the output directory on construction and counts what it has
/// written. Safe to share across threads.
#[derive(Debug)]
pub struct LocalFileWriter {
    output_dir: PathBuf,
    options: WriteOptions,
    files_written: AtomicUsize,
    bytes_written: AtomicU64,
}

impl LocalFileWriter {
    /// Creates a writer for `output_dir`, creating the directory if needed
    pub fn new(output_dir: impl AsRef<Path>, options: WriteOptions) -> Result<Self, SinkError> {
        let output_dir = output_dir.as_ref();
        fs::create_dir_all(output_dir).map_err(|e| map_io(output_dir, e))?;

        Ok(Self {
            output_dir: output_dir.to_path_buf(),
            options,
            files_written: AtomicUsize::new(0),
            bytes_written: AtomicU64::new(0),
        })
    }

    /// Returns the output directory
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Generates the output path for an artifact
    fn output_path(&self, artifact: &Artifact<'_>) -> PathBuf {
        let mut path = self.output_dir.clone();
        if self.options.organize_by_type {
            path.push(artifact.type_id());
        }
        path.push(artifact.filename());
        path
    }
}

impl ArtifactSink for LocalFileWriter {
    fn write(&self, artifact: &Artifact<'_>) -> Result<WriteResult, SinkError> {
        let output_path = self.output_path(artifact);

        if let Some(parent) = output_path.parent() {
            fs::create_dir_all(parent).map_err(|e| map_io(parent, e))?;
        }

        let mut open = OpenOptions::new();
        open.write(true);
        if self.options.overwrite {
            open.create(true).truncate(true);
        } else {
            open.create_new(true);
        }

        let mut file = open.open(&output_path).map_err(|e| match e.kind() {
            io::ErrorKind::AlreadyExists => {
                SinkError::FileExists(output_path.display().to_string())
            }
            _ => map_io(&output_path, e),
        })?;
        file.write_all(artifact.data())
            .map_err(|e| map_io(&output_path, e))?;
        if self.options.sync {
            file.sync_all().map_err(|e| map_io(&output_path, e))?;
        }

        let saved_size = artifact.size();
        self.files_written.fetch_add(1, Ordering::Relaxed);
        self.bytes_written.fetch_add(saved_size, Ordering::Relaxed);

        Ok(WriteResult {
            saved_path: Some(output_path),
            saved_size,
            sha256: Some(hex::encode(Sha256::digest(artifact.data()))),
        })
    }

    fn files_written(&self) -> usize {
        self.files_written.load(Ordering::Relaxed)
    }

    fn bytes_written(&self) -> u64 {
        self.bytes_written.load(Ordering::Relaxed)
    }
}

fn map_io(path: &Path, error: io::Error) -> SinkError {
    match error.kind() {
        io::ErrorKind::PermissionDenied => SinkError::PermissionDenied(path.display().to_string()),
        io::ErrorKind::StorageFull => SinkError::DiskFull(path.display().to_string()),
        _ => SinkError::IoError(error),
    }
}
