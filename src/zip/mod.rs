//! ZIP archive reading and extraction.
//!
//! Takeout batches arrive as numbered zip parts, so this module only
//! needs to read: list an archive's entries and unpack all of them into
//! a destination directory.
//!
//! ## Layout
//!
//! - [`format`]: the on-disk ZIP structures (end of central directory,
//!   ZIP64 records, per-entry metadata)
//! - [`archive`]: [`ZipArchive`], which locates the central directory
//!   from the file tail and drives extraction
//!
//! A ZIP file is read from the end: the End of Central Directory record
//! points at the Central Directory, which carries the metadata for every
//! entry. Individual parts of a Takeout export regularly exceed 4 GiB,
//! so the ZIP64 forms of both records are honored.
//!
//! ## Supported features
//!
//! - Standard ZIP and ZIP64 archives
//! - STORED (uncompressed) and DEFLATE entries
//!
//! ## Limitations
//!
//! - No encryption support
//! - No multi-disk archive support
//! - Entry CRCs are not verified

mod archive;
mod format;

pub use archive::{ArchiveStats, ZipArchive};
pub use format::{CompressionMethod, ZipEntry};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ZipError {
    /// No End of Central Directory record was found in the file tail.
    #[error("not a zip archive: no end of central directory record")]
    NotAnArchive,

    /// A structure was present but did not decode as the format requires.
    #[error("corrupt archive: {0}")]
    Corrupt(&'static str),

    /// Entry uses a compression method other than STORED or DEFLATE.
    #[error("unsupported compression method {method} for entry {name}")]
    UnsupportedCompression { name: String, method: u16 },

    /// Entry name escapes the destination directory.
    #[error("refusing to extract entry with unsafe path: {0}")]
    UnsafeEntryName(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
