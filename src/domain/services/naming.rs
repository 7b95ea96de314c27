//! Artifact naming
//!
//! Names take the shape `{type_id}_{HHMMSS}_{sequence}.{type_id}`. The
//! clock is injected so that tests and callers running scans side by side
//! control the timestamp field.

use chrono::Local;

/// Source of the `HHMMSS` field in artifact names
pub trait NamingClock: Send + Sync {
    /// Returns the current timestamp field
    fn stamp(&self) -> String;
}

/// Wall clock in local time
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalClock;

impl NamingClock for LocalClock {
    fn stamp(&self) -> String {
        Local::now().format("%H%M%S").to_string()
    }
}

/// A clock that always returns the same stamp
#[derive(Debug, Clone)]
pub struct FixedClock(String);

impl FixedClock {
    pub fn new(stamp: impl Into<String>) -> Self {
        Self(stamp.into())
    }
}

impl NamingClock for FixedClock {
    fn stamp(&self) -> String {
        self.0.clone()
    }
}

/// Builds the suggested file name for an artifact
pub fn artifact_filename(type_id: &str, stamp: &str, sequence: u64) -> String {
    format!("{type_id}_{stamp}_{sequence}.{type_id}")
}
