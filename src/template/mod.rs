/// Transient per-file entities.
pub mod job;

/// Read → Transform pipeline for a single template.
pub mod processor;
