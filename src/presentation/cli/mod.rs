//! CLI module

mod commands;
mod progress;

pub use commands::Cli;
pub use progress::ProgressReporter;
