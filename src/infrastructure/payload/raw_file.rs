//! Raw file payload source
//!
//! Treats the input file as an already assembled payload stream, byte for
//! byte. Useful for streams exported by other tools and for tests.

use crate::domain::repositories::{PayloadError, PayloadSource};
use bytes::Bytes;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Reads the whole file as the payload buffer
#[derive(Debug, Clone, Copy, Default)]
pub struct RawFilePayloadSource;

impl RawFilePayloadSource {
    pub fn new() -> Self {
        Self
    }
}

impl PayloadSource for RawFilePayloadSource {
    fn load(&self, path: &Path) -> Result<Bytes, PayloadError> {
        let data = fs::read(path).map_err(|e| PayloadError::from_io(path, e))?;
        debug!(path = %path.display(), bytes = data.len(), "Loaded raw payload");
        Ok(Bytes::from(data))
    }

    fn describe(&self) -> String {
        "raw file".to_string()
    }
}
