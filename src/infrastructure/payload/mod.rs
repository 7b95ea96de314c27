//! Payload source implementations

mod raw_file;
mod tshark;

pub use raw_file::RawFilePayloadSource;
pub use tshark::{TsharkConfig, TsharkPayloadSource, decode_field_lines};
