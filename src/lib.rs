//! Content-based recovery of files embedded in network capture payloads.
//!
//! The [`domain`] layer holds the signature catalog and the carving
//! engine; [`infrastructure`] provides payload sources (tshark, raw dumps)
//! and artifact sinks; [`application`] wires them into one extraction run.

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod presentation;

pub use application::dto::{ExtractionOptions, ExtractionReport};
pub use application::{ExtractError, ExtractFilesUseCase, ProgressEvent};
pub use domain::entities::{Artifact, ArtifactDescriptor, FileSignature, FileType, ScanResult};
pub use domain::repositories::{ArtifactSink, PayloadError, PayloadSource, SinkError};
pub use domain::services::{CancellationToken, CarverError, CarvingEngine, SignatureCatalog};
