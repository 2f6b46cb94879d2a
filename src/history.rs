//! Export history and staleness checking.
//!
//! The destination tree doubles as the durable record of past runs: each
//! unpacked batch leaves a directory whose name starts with its export
//! date. When an invocation finds nothing to do, the age of the newest
//! such directory tells us whether the upstream export schedule is still
//! alive. The listing sits behind [`BatchHistory`] so the check can run
//! against an in-memory fixture in tests.

use std::io;
use std::path::PathBuf;

use chrono::{Duration, NaiveDate};

use crate::error::ExportError;

/// How long the destination tree may go without a new batch before the
/// absence of input is itself an error.
pub const STALE_AFTER_WEEKS: i64 = 9;

/// Read-only view of the batches already unpacked under the destination
/// root.
pub trait BatchHistory {
    /// Names of the immediate child directories of the destination root.
    fn batch_names(&self) -> Result<Vec<String>, ExportError>;
}

/// [`BatchHistory`] backed by the real destination directory.
pub struct FsBatchHistory {
    root: PathBuf,
}

impl FsBatchHistory {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl BatchHistory for FsBatchHistory {
    fn batch_names(&self) -> Result<Vec<String>, ExportError> {
        let entries = match std::fs::read_dir(&self.root) {
            Ok(entries) => entries,
            // A destination root that does not exist yet means no batch
            // has ever been unpacked, which is not an error here.
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(ExportError::Io)?;
            if entry.file_type().map_err(ExportError::Io)?.is_dir() {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        Ok(names)
    }
}

/// Parse the leading `YYYYMMDD` date of a batch directory name. The date
/// must be followed by a literal `T`; anything else is some unrelated
/// directory and is skipped by the caller.
fn leading_date(name: &str) -> Option<NaiveDate> {
    let date = name.get(0..8)?;
    if name.as_bytes().get(8) != Some(&b'T') {
        return None;
    }
    NaiveDate::parse_from_str(date, "%Y%m%d").ok()
}

/// Fail if the newest batch in the history is older than
/// [`STALE_AFTER_WEEKS`].
///
/// A history with no parseable batch directory never fails: the first
/// run has nothing to be stale against. `today` is passed in so tests
/// control the clock.
pub fn check_freshness(history: &dyn BatchHistory, today: NaiveDate) -> Result<(), ExportError> {
    let names = history.batch_names()?;
    let newest = names
        .iter()
        .filter_map(|name| leading_date(name).map(|date| (date, name)))
        .max_by_key(|(date, _)| *date);

    let Some((date, name)) = newest else {
        return Ok(());
    };

    let age = today - date;
    if age > Duration::weeks(STALE_AFTER_WEEKS) {
        return Err(ExportError::ExportStale {
            last: name.clone(),
            age_days: age.num_days(),
        });
    }
    Ok(())
}
