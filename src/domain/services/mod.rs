//! Domain services
//!
//! The signature catalog and the carving engine that runs over it.

mod cancellation;
mod carver;
mod naming;
mod signature_catalog;

pub use cancellation::CancellationToken;
pub use carver::{CarverError, CarvingEngine, Delimiter, HeaderMatches, delimit};
pub use naming::{FixedClock, LocalClock, NamingClock, artifact_filename};
pub use signature_catalog::SignatureCatalog;
