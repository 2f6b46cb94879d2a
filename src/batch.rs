//! Batch validation.
//!
//! A batch is one export run: a set of numbered zip parts plus any loose
//! files that arrived alongside them. Before anything touches the disk,
//! the whole listing is validated as a unit:
//!
//! 1. every zip file must carry a batch timestamp token in its name,
//! 2. every file (zip or not) must carry a trailing 3-digit part number,
//! 3. the pooled part numbers must form a contiguous ascending run,
//! 4. all zip timestamps must agree on exactly one token.
//!
//! The validator is pure: it looks only at the path strings it is given
//! and never touches the file system.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use crate::error::ExportError;

/// Timestamp token between `takeout-` and the part number, zip files only.
static TIMESTAMP_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^.*/takeout-([0-9TZ]*)-[0-9]+\.zip$").expect("timestamp pattern")
});

/// Trailing 3-digit part number before the extension, any file.
static PART_NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^.*/.*-([0-9]{3})\.\w+$").expect("part number pattern"));

/// What the validator decided about a source listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchPlan {
    /// One complete batch; unpack it under this timestamp token.
    Export { timestamp: String },
    /// No source files at all. The caller should check export freshness
    /// and otherwise do nothing.
    Empty,
}

/// Whether a source file is a zip part (as opposed to a loose file).
pub fn is_archive(path: &Path) -> bool {
    path.to_string_lossy().ends_with(".zip")
}

/// Extract the batch timestamp token from a zip part's path.
///
/// Returns `None` when the name does not follow the
/// `takeout-<token>-<part>.zip` contract.
pub fn archive_timestamp(path: &Path) -> Option<String> {
    let text = path.to_string_lossy();
    let caps = TIMESTAMP_RE.captures(&text)?;
    Some(caps.get(1)?.as_str().to_string())
}

/// Extract the trailing 3-digit part number from any source file's path.
pub fn part_number(path: &Path) -> Option<u32> {
    let text = path.to_string_lossy();
    let caps = PART_NUMBER_RE.captures(&text)?;
    caps.get(1)?.as_str().parse().ok()
}

/// Validate one source listing as a single export batch.
///
/// Part numbers are pooled across zip and non-zip files: everything in
/// one drop shares one monotonic sequence. The contiguity check is
/// relative only, so the run may start at any value.
///
/// # Errors
///
/// Any inconsistency in the listing is fatal for the whole invocation:
/// [`ExportError::MissingTimestamp`], [`ExportError::MissingPartNumber`],
/// [`ExportError::MissingPart`], [`ExportError::NoTimestampFound`] or
/// [`ExportError::AmbiguousBatch`].
pub fn validate_batch(paths: &[PathBuf]) -> Result<BatchPlan, ExportError> {
    let mut timestamps = BTreeSet::new();
    let mut parts = Vec::with_capacity(paths.len());

    for path in paths {
        if is_archive(path) {
            match archive_timestamp(path) {
                Some(token) => {
                    timestamps.insert(token);
                }
                None => return Err(ExportError::MissingTimestamp { path: path.clone() }),
            }
        }

        match part_number(path) {
            Some(number) => parts.push(number),
            None => return Err(ExportError::MissingPartNumber { path: path.clone() }),
        }
    }

    parts.sort_unstable();
    for pair in parts.windows(2) {
        // A gap is a step > 1, a duplicate is a step of 0. Both mean the
        // batch is incomplete or double-synced.
        if pair[1] - pair[0] != 1 {
            return Err(ExportError::MissingPart {
                after: pair[0],
                next: pair[1],
            });
        }
    }

    let mut tokens: Vec<String> = timestamps.into_iter().collect();
    match tokens.len() {
        0 if paths.is_empty() => Ok(BatchPlan::Empty),
        // Files without any timestamp could be the tail of a sync still
        // in flight. Copying them into a guessed batch is unsafe.
        0 => Err(ExportError::NoTimestampFound),
        1 => Ok(BatchPlan::Export {
            timestamp: tokens.remove(0),
        }),
        _ => Err(ExportError::AmbiguousBatch { tokens }),
    }
}
