//! Error types for the export pipeline.
//!
//! Every validation and staleness failure is a named, terminal condition:
//! each one signals a situation (ambiguous batch, missing part, stale
//! upstream export) that needs a human decision, not an automated retry.
//! Nothing below `main` terminates the process; the binary entry point is
//! the only place an [`ExportError`] becomes an exit code.

use std::path::PathBuf;

use thiserror::Error;

use crate::zip::ZipError;

/// Result type alias for export operations
pub type Result<T> = std::result::Result<T, ExportError>;

#[derive(Debug, Error)]
pub enum ExportError {
    /// A zip file whose name does not carry a batch timestamp token.
    /// Indicates an upstream naming change, never safe to guess around.
    #[error("zip file without timestamp: {}", .path.display())]
    MissingTimestamp { path: PathBuf },

    /// A source file whose name does not end in a 3-digit part number.
    #[error("file did not have a part number: {}", .path.display())]
    MissingPartNumber { path: PathBuf },

    /// The pooled part numbers are not a contiguous ascending run.
    /// Covers both gaps and duplicates.
    #[error("part numbers not contiguous: {after:03} followed by {next:03}")]
    MissingPart { after: u32, next: u32 },

    /// Source files are present but none carried a timestamp. This can
    /// happen when a partial upstream sync is observed mid-flight.
    #[error("found source files, but no timestamps")]
    NoTimestampFound,

    /// More than one batch is sitting in the source directory. Batches
    /// are never auto-merged.
    #[error("multiple timestamps, needs manual cleanup: {}", .tokens.join(", "))]
    AmbiguousBatch { tokens: Vec<String> },

    /// The newest destination directory is older than the staleness
    /// threshold; the upstream export schedule has likely stopped.
    #[error("no new export for {age_days} days, most recent is {last}")]
    ExportStale { last: String, age_days: i64 },

    /// Reading or extracting a zip archive failed.
    #[error("archive error: {0}")]
    Archive(#[from] ZipError),

    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
