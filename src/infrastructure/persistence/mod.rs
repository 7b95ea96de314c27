//! Artifact sink implementations

mod local_file_writer;
mod memory_sink;

pub use local_file_writer::LocalFileWriter;
pub use memory_sink::{CallbackSink, MemorySink};
