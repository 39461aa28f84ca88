//! Diagnostic logging for the CLI.

pub mod tracing_setup;
