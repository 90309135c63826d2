/// Handles argument parsing and run orchestration.
pub mod cli;

/// Defines custom error types.
pub mod error;

/// Constants used throughout the application.
pub mod constants;

/// Template file discovery under the processing root.
pub mod discovery;

/// Template transformation engine.
pub mod engine;

/// Engine host abstraction supplying per-file output decisions.
pub mod host;

/// A set of helpers for working with the file system.
pub mod ioutils;

/// Per-file template processing pipeline.
pub mod template;
