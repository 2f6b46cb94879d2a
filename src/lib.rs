//! # takein
//!
//! Validates batches of Takeout zip exports and unpacks them into
//! timestamped directories.
//!
//! A scheduled upstream export drops numbered zip parts (plus the odd
//! loose file) into a sync directory. This crate ingests one such batch
//! per invocation: it checks that the batch is complete and internally
//! consistent, extracts everything into `<dest_root>/<timestamp>/`, and
//! deletes the originals once the whole batch has landed. When there is
//! nothing to ingest, it checks how long ago the last batch arrived and
//! fails if the upstream export schedule appears to have stopped.
//!
//! ## Batch rules
//!
//! - every zip part is named `takeout-<timestamp>-<NNN>.zip`,
//! - every source file carries a trailing 3-digit part number,
//! - part numbers, pooled across all files, form a contiguous run,
//! - exactly one timestamp token per batch; never auto-merged.
//!
//! ## Example
//!
//! ```no_run
//! use std::path::Path;
//! use takein::{ExportOutcome, run_export};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), takein::ExportError> {
//!     let outcome = run_export(Path::new("sync/takeout"), Path::new("backup")).await?;
//!     if let ExportOutcome::Completed(summary) = outcome {
//!         println!("{} files, {} bytes", summary.files, summary.bytes);
//!     }
//!     Ok(())
//! }
//! ```

pub mod batch;
pub mod cli;
pub mod error;
pub mod export;
pub mod history;
pub mod io;
pub mod zip;

pub use batch::{BatchPlan, validate_batch};
pub use cli::Cli;
pub use error::ExportError;
pub use export::{ExportOutcome, ExportSummary, run_export};
pub use history::{BatchHistory, FsBatchHistory, check_freshness};
pub use io::{LocalFileReader, ReadAt};
pub use zip::{ZipArchive, ZipEntry, ZipError};
