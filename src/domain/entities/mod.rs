//! Domain entities
//!
//! Core business objects of content-based carving: signatures, the
//! candidates they delimit, the artifacts that survive validation and the
//! run summary.

mod artifact;
mod candidate;
mod file_signature;
mod scan_result;

pub use artifact::{Artifact, ArtifactDescriptor};
pub use candidate::Candidate;
pub use file_signature::{FileSignature, FileType};
pub use scan_result::{ScanProgress, ScanResult};
