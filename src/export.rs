//! Export driver: one invocation, one batch.
//!
//! Lists the source directory, validates the listing as a single batch,
//! unpacks it into `<dest_root>/<timestamp>/`, and only then deletes the
//! originals. Deleting is the commit point: any failure while copying or
//! extracting aborts the run with every source file still in place, and
//! a rerun starts over from validation.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use tokio::fs;
use tracing::{debug, info};

use crate::batch::{BatchPlan, is_archive, validate_batch};
use crate::error::ExportError;
use crate::history::{FsBatchHistory, check_freshness};
use crate::io::LocalFileReader;
use crate::zip::ZipArchive;

/// What one invocation did.
#[derive(Debug)]
pub enum ExportOutcome {
    /// No source files and the export history is fresh enough.
    NothingToDo,
    /// A batch was unpacked and the originals were removed.
    Completed(ExportSummary),
}

/// Tally of one completed batch.
#[derive(Debug)]
pub struct ExportSummary {
    /// Archive entries extracted plus loose files copied
    pub files: usize,
    /// Uncompressed bytes written into the destination
    pub bytes: u64,
    pub elapsed: Duration,
    pub dest_dir: PathBuf,
}

/// Run one export pass over `src_dir`, unpacking into a timestamped
/// directory under `dest_root`.
///
/// # Errors
///
/// Fails on any batch inconsistency (see [`validate_batch`]), on a stale
/// export history when there is nothing to do, and on any archive or
/// file-system error during the copy loop. None of these leave the
/// source directory modified.
pub async fn run_export(src_dir: &Path, dest_root: &Path) -> Result<ExportOutcome, ExportError> {
    let started = Instant::now();

    let sources = list_source_files(src_dir).await?;
    debug!(count = sources.len(), src = %src_dir.display(), "listed source files");

    let timestamp = match validate_batch(&sources)? {
        BatchPlan::Export { timestamp } => timestamp,
        BatchPlan::Empty => {
            let history = FsBatchHistory::new(dest_root);
            check_freshness(&history, Utc::now().date_naive())?;
            info!("no source files, nothing to do");
            return Ok(ExportOutcome::NothingToDo);
        }
    };

    let dest_dir = dest_root.join(&timestamp);
    info!(dest = %dest_dir.display(), "unpacking batch");
    fs::create_dir_all(&dest_dir).await?;

    let mut files = 0usize;
    let mut bytes = 0u64;

    for path in &sources {
        if is_archive(path) {
            let reader = Arc::new(LocalFileReader::open(path)?);
            let stats = ZipArchive::new(reader).extract_all(&dest_dir).await?;
            info!(
                entries = stats.entries,
                bytes = stats.bytes,
                archive = %path.display(),
                "extracted archive"
            );
            files += stats.entries;
            bytes += stats.bytes;
        } else {
            let name = path.file_name().ok_or_else(|| {
                io::Error::new(io::ErrorKind::InvalidInput, "source entry has no file name")
            })?;
            let copied = fs::copy(path, dest_dir.join(name)).await?;
            info!(bytes = copied, file = %path.display(), "copied file");
            files += 1;
            bytes += copied;
        }
    }

    // Everything landed; deleting the originals commits the batch.
    for path in &sources {
        fs::remove_file(path).await?;
    }

    Ok(ExportOutcome::Completed(ExportSummary {
        files,
        bytes,
        elapsed: started.elapsed(),
        dest_dir,
    }))
}

/// Non-recursive listing of the source directory, sorted for
/// deterministic processing order.
async fn list_source_files(src_dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut entries = fs::read_dir(src_dir).await?;
    let mut paths = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        paths.push(entry.path());
    }
    paths.sort();
    Ok(paths)
}
