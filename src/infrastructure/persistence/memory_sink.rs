//! In-process sinks
//!
//! Sinks that keep artifacts in memory or forward them to a closure, for
//! library callers that do their own persistence.

use crate::domain::entities::Artifact;
use crate::domain::repositories::{ArtifactSink, SinkError, WriteResult};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// Collects owned copies of every artifact
#[derive(Debug, Default)]
pub struct MemorySink {
    artifacts: Mutex<Vec<Artifact<'static>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the collected artifacts, in emission order
    pub fn artifacts(&self) -> Vec<Artifact<'static>> {
        self.artifacts.lock().clone()
    }

    /// Takes the collected artifacts, leaving the sink empty
    pub fn take(&self) -> Vec<Artifact<'static>> {
        std::mem::take(&mut *self.artifacts.lock())
    }
}

impl ArtifactSink for MemorySink {
    fn write(&self, artifact: &Artifact<'_>) -> Result<WriteResult, SinkError> {
        let owned = artifact.clone().into_owned();
        let saved_size = owned.size();
        self.artifacts.lock().push(owned);
        Ok(WriteResult {
            saved_path: None,
            saved_size,
            sha256: None,
        })
    }

    fn files_written(&self) -> usize {
        self.artifacts.lock().len()
    }

    fn bytes_written(&self) -> u64 {
        self.artifacts.lock().iter().map(Artifact::size).sum()
    }
}

/// Forwards every artifact to a closure
///
/// The closure sees the borrowed bytes; returning an error aborts the run.
pub struct CallbackSink<F> {
    callback: F,
    files_written: AtomicUsize,
    bytes_written: AtomicU64,
}

impl<F> CallbackSink<F>
where
    F: Fn(&Artifact<'_>) -> Result<(), SinkError> + Send + Sync,
{
    pub fn new(callback: F) -> Self {
        Self {
            callback,
            files_written: AtomicUsize::new(0),
            bytes_written: AtomicU64::new(0),
        }
    }
}

impl<F> ArtifactSink for CallbackSink<F>
where
    F: Fn(&Artifact<'_>) -> Result<(), SinkError> + Send + Sync,
{
    fn write(&self, artifact: &Artifact<'_>) -> Result<WriteResult, SinkError> {
        (self.callback)(artifact)?;
        self.files_written.fetch_add(1, Ordering::Relaxed);
        self.bytes_written.fetch_add(artifact.size(), Ordering::Relaxed);
        Ok(WriteResult {
            saved_path: None,
            saved_size: artifact.size(),
            sha256: None,
        })
    }

    fn files_written(&self) -> usize {
        self.files_written.load(Ordering::Relaxed)
    }

    fn bytes_written(&self) -> u64 {
        self.bytes_written.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::FileType;

    #[test]
    fn memory_sink_outlives_the_buffer() {
        let sink = MemorySink::new();
        {
            let buffer = vec![0xFF, 0xFB, 0x90];
            let artifact = Artifact::new(0, FileType::Mp3, 4, &buffer, "mp3_000000_0.mp3".into());
            sink.write(&artifact).unwrap();
        }
        let artifacts = sink.take();
        assert_eq!(artifacts.len(), 1);
        assert_eq!(artifacts[0].data(), &[0xFF, 0xFB, 0x90]);
        assert_eq!(sink.files_written(), 0);
    }

    #[test]
    fn callback_errors_propagate() {
        let sink = CallbackSink::new(|a: &Artifact<'_>| {
            if a.size() > 2 {
                Err(SinkError::Rejected("too big".into()))
            } else {
                Ok(())
            }
        });
        let small = [0x1F, 0x8B];
        let big = [0x1F, 0x8B, 0x00];
        sink.write(&Artifact::new(0, FileType::Gz, 0, &small, String::new())).unwrap();
        assert!(sink.write(&Artifact::new(1, FileType::Gz, 2, &big, String::new())).is_err());
        assert_eq!(sink.files_written(), 1);
        assert_eq!(sink.bytes_written(), 2);
    }
}
