//! Repository traits (interfaces)
//!
//! These traits define the contracts for the collaborators the carver
//! depends on: where payload bytes come from and where artifacts go.

mod artifact_sink;
mod payload_source;

pub use artifact_sink::{ArtifactSink, SinkError, WriteOptions, WriteResult};
pub use payload_source::{PayloadError, PayloadSource};
