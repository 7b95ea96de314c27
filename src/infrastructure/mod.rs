//! Infrastructure layer
//!
//! Concrete implementations of the domain repositories: where payload
//! bytes come from and where carved artifacts are written.

pub mod payload;
pub mod persistence;
