//! Application layer
//!
//! Use cases that orchestrate payload assembly, carving and persistence.

pub mod dto;
mod extract_files;

pub use extract_files::{ExtractError, ExtractFilesUseCase, ProgressEvent};
