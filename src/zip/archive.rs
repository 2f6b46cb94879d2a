//! Central-directory driven archive reading.
//!
//! [`ZipArchive`] wraps a [`ReadAt`] source and reads it the way the ZIP
//! format intends: locate the End of Central Directory record in the
//! file tail, follow the ZIP64 indirection when the archive is large,
//! parse the Central Directory for entry metadata, then pull each
//! entry's data through its Local File Header.

use std::io::{Cursor, Read};
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use byteorder::{LittleEndian, ReadBytesExt};
use flate2::read::DeflateDecoder;
use tokio::fs;

use crate::io::ReadAt;

use super::ZipError;
use super::format::*;

/// Maximum ZIP comment size allowed by the format (65535 bytes).
///
/// Bounds the tail scan when the EOCD is not at the very end.
const MAX_COMMENT_SIZE: u64 = 65535;

/// What [`ZipArchive::extract_all`] unpacked: entry count and
/// uncompressed byte total.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArchiveStats {
    pub entries: usize,
    pub bytes: u64,
}

/// Read-only view of one zip archive.
pub struct ZipArchive<R: ReadAt> {
    reader: Arc<R>,
    size: u64,
}

impl<R: ReadAt> ZipArchive<R> {
    pub fn new(reader: Arc<R>) -> Self {
        let size = reader.size();
        Self { reader, size }
    }

    /// List every entry recorded in the Central Directory.
    ///
    /// # Errors
    ///
    /// [`ZipError::NotAnArchive`] when no EOCD record exists, or
    /// [`ZipError::Corrupt`] when the directory does not decode.
    pub async fn entries(&self) -> Result<Vec<ZipEntry>, ZipError> {
        let (eocd, eocd_offset) = self.locate_eocd().await?;

        let (cd_offset, cd_size, total_entries) = if eocd.is_zip64() {
            let eocd64 = self.read_zip64_eocd(eocd_offset).await?;
            (eocd64.cd_offset, eocd64.cd_size, eocd64.total_entries)
        } else {
            (
                eocd.cd_offset as u64,
                eocd.cd_size as u64,
                eocd.total_entries as u64,
            )
        };

        if cd_offset.checked_add(cd_size).is_none_or(|end| end > self.size) {
            return Err(ZipError::Corrupt("central directory out of bounds"));
        }

        // One read for the whole directory; entries are packed back to back.
        let mut cd_data = vec![0u8; cd_size as usize];
        self.reader.read_exact_at(cd_offset, &mut cd_data).await?;

        let mut entries = Vec::with_capacity(total_entries as usize);
        let mut cursor = Cursor::new(cd_data.as_slice());
        for _ in 0..total_entries {
            entries.push(parse_central_header(&mut cursor)?);
        }

        Ok(entries)
    }

    /// Read one entry's data, inflating it if necessary.
    pub async fn read_entry(&self, entry: &ZipEntry) -> Result<Vec<u8>, ZipError> {
        let inflate = match entry.method {
            CompressionMethod::Stored => false,
            CompressionMethod::Deflate => true,
            CompressionMethod::Other(method) => {
                return Err(ZipError::UnsupportedCompression {
                    name: entry.name.clone(),
                    method,
                });
            }
        };

        let data_offset = self.data_offset(entry).await?;
        let mut data = vec![0u8; entry.compressed_size as usize];
        self.reader.read_exact_at(data_offset, &mut data).await?;

        if inflate {
            let mut inflated = Vec::with_capacity(entry.uncompressed_size as usize);
            DeflateDecoder::new(data.as_slice()).read_to_end(&mut inflated)?;
            Ok(inflated)
        } else {
            Ok(data)
        }
    }

    /// Unpack every entry under `dest`, preserving archive-relative
    /// paths. Directory entries become directories; existing files are
    /// overwritten.
    ///
    /// # Errors
    ///
    /// Fails on the first entry that cannot be read or written, leaving
    /// whatever was already extracted in place.
    pub async fn extract_all(&self, dest: &Path) -> Result<ArchiveStats, ZipError> {
        let entries = self.entries().await?;
        let mut stats = ArchiveStats::default();

        for entry in &entries {
            let target = dest.join(entry_relative_path(&entry.name)?);

            if entry.is_directory {
                fs::create_dir_all(&target).await?;
            } else {
                if let Some(parent) = target.parent() {
                    if !parent.as_os_str().is_empty() {
                        fs::create_dir_all(parent).await?;
                    }
                }
                let data = self.read_entry(entry).await?;
                stats.bytes += data.len() as u64;
                fs::write(&target, &data).await?;
            }
            stats.entries += 1;
        }

        Ok(stats)
    }

    /// Find the End of Central Directory record in the file tail.
    async fn locate_eocd(&self) -> Result<(EndOfCentralDirectory, u64), ZipError> {
        if self.size < EndOfCentralDirectory::SIZE as u64 {
            return Err(ZipError::NotAnArchive);
        }

        // Common case first: no archive comment, record flush at the end.
        let offset = self.size - EndOfCentralDirectory::SIZE as u64;
        let mut buf = vec![0u8; EndOfCentralDirectory::SIZE];
        self.reader.read_exact_at(offset, &mut buf).await?;

        if &buf[0..4] == EndOfCentralDirectory::SIGNATURE && &buf[20..22] == b"\x00\x00" {
            return Ok((EndOfCentralDirectory::parse(&buf)?, offset));
        }

        // A comment pushes the record inward; scan backwards for the
        // signature, bounded by the maximum comment the format allows.
        let scan_size = (MAX_COMMENT_SIZE + EndOfCentralDirectory::SIZE as u64).min(self.size);
        let scan_start = self.size - scan_size;

        let mut tail = vec![0u8; scan_size as usize];
        self.reader.read_exact_at(scan_start, &mut tail).await?;

        for i in (0..tail.len().saturating_sub(EndOfCentralDirectory::SIZE)).rev() {
            if &tail[i..i + 4] == EndOfCentralDirectory::SIGNATURE {
                // A real record's comment length accounts for exactly the
                // bytes that follow it.
                let comment_len = u16::from_le_bytes([tail[i + 20], tail[i + 21]]) as usize;
                if comment_len == tail.len() - i - EndOfCentralDirectory::SIZE {
                    let eocd =
                        EndOfCentralDirectory::parse(&tail[i..i + EndOfCentralDirectory::SIZE])?;
                    return Ok((eocd, scan_start + i as u64));
                }
            }
        }

        Err(ZipError::NotAnArchive)
    }

    /// Read the ZIP64 End of Central Directory record; its locator sits
    /// immediately before the regular EOCD.
    async fn read_zip64_eocd(
        &self,
        eocd_offset: u64,
    ) -> Result<Zip64EndOfCentralDirectory, ZipError> {
        let locator_offset = eocd_offset
            .checked_sub(Zip64Locator::SIZE as u64)
            .ok_or(ZipError::Corrupt("missing ZIP64 locator record"))?;
        let mut locator_buf = vec![0u8; Zip64Locator::SIZE];
        self.reader
            .read_exact_at(locator_offset, &mut locator_buf)
            .await?;
        let locator = Zip64Locator::parse(&locator_buf)?;

        let mut eocd64_buf = vec![0u8; Zip64EndOfCentralDirectory::MIN_SIZE];
        self.reader
            .read_exact_at(locator.eocd64_offset, &mut eocd64_buf)
            .await?;
        Zip64EndOfCentralDirectory::parse(&eocd64_buf)
    }

    /// Resolve where an entry's data starts. The Local File Header has
    /// its own variable-length name and extra field, so the offset can
    /// only be computed by reading it.
    async fn data_offset(&self, entry: &ZipEntry) -> Result<u64, ZipError> {
        let mut header = vec![0u8; LOCAL_HEADER_SIZE];
        self.reader
            .read_exact_at(entry.header_offset, &mut header)
            .await?;

        if &header[0..4] != LOCAL_HEADER_SIGNATURE {
            return Err(ZipError::Corrupt("bad local file header"));
        }

        let mut cursor = Cursor::new(header.as_slice());
        cursor.set_position(26); // name and extra length fields
        let name_len = cursor.read_u16::<LittleEndian>()? as u64;
        let extra_len = cursor.read_u16::<LittleEndian>()? as u64;

        Ok(entry.header_offset + LOCAL_HEADER_SIZE as u64 + name_len + extra_len)
    }
}

/// Parse one Central Directory File Header from the directory buffer.
fn parse_central_header(cursor: &mut Cursor<&[u8]>) -> Result<ZipEntry, ZipError> {
    let mut sig = [0u8; 4];
    cursor.read_exact(&mut sig)?;
    if sig != CENTRAL_HEADER_SIGNATURE {
        return Err(ZipError::Corrupt("bad central directory header"));
    }

    let _version_made_by = cursor.read_u16::<LittleEndian>()?;
    let _version_needed = cursor.read_u16::<LittleEndian>()?;
    let _flags = cursor.read_u16::<LittleEndian>()?;
    let method = cursor.read_u16::<LittleEndian>()?;
    let _last_mod_time = cursor.read_u16::<LittleEndian>()?;
    let _last_mod_date = cursor.read_u16::<LittleEndian>()?;
    let _crc32 = cursor.read_u32::<LittleEndian>()?;
    let mut compressed_size = cursor.read_u32::<LittleEndian>()? as u64;
    let mut uncompressed_size = cursor.read_u32::<LittleEndian>()? as u64;
    let name_len = cursor.read_u16::<LittleEndian>()?;
    let extra_len = cursor.read_u16::<LittleEndian>()?;
    let comment_len = cursor.read_u16::<LittleEndian>()?;
    let _disk_number_start = cursor.read_u16::<LittleEndian>()?;
    let _internal_attrs = cursor.read_u16::<LittleEndian>()?;
    let _external_attrs = cursor.read_u32::<LittleEndian>()?;
    let mut header_offset = cursor.read_u32::<LittleEndian>()? as u64;

    let mut name_bytes = vec![0u8; name_len as usize];
    cursor.read_exact(&mut name_bytes)?;
    // Lossy conversion keeps non-UTF8 names extractable under a mangled name
    let name = String::from_utf8_lossy(&name_bytes).to_string();
    let is_directory = name.ends_with('/');

    // The ZIP64 extended field (id 0x0001) carries the real value for
    // every header field pegged at its 32-bit maximum.
    let extra_end = cursor.position() + extra_len as u64;
    while cursor.position() + 4 <= extra_end {
        let field_id = cursor.read_u16::<LittleEndian>()?;
        let field_size = cursor.read_u16::<LittleEndian>()?;

        if field_id == 0x0001 {
            if uncompressed_size == 0xFFFFFFFF && cursor.position() + 8 <= extra_end {
                uncompressed_size = cursor.read_u64::<LittleEndian>()?;
            }
            if compressed_size == 0xFFFFFFFF && cursor.position() + 8 <= extra_end {
                compressed_size = cursor.read_u64::<LittleEndian>()?;
            }
            if header_offset == 0xFFFFFFFF && cursor.position() + 8 <= extra_end {
                header_offset = cursor.read_u64::<LittleEndian>()?;
            }
            break;
        }
        cursor.set_position(cursor.position() + field_size as u64);
    }
    cursor.set_position(extra_end + comment_len as u64);

    Ok(ZipEntry {
        name,
        method: CompressionMethod::from_u16(method),
        compressed_size,
        uncompressed_size,
        header_offset,
        is_directory,
    })
}

/// Turn an archive entry name into a destination-relative path, refusing
/// anything that would land outside the destination.
fn entry_relative_path(name: &str) -> Result<PathBuf, ZipError> {
    let mut path = PathBuf::new();
    for component in Path::new(name).components() {
        match component {
            Component::Normal(part) => path.push(part),
            Component::CurDir => {}
            _ => return Err(ZipError::UnsafeEntryName(name.to_string())),
        }
    }
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_entry_names_stay_relative() {
        assert_eq!(
            entry_relative_path("sub/dir/b.txt").unwrap(),
            PathBuf::from("sub/dir/b.txt")
        );
        assert_eq!(entry_relative_path("./a.txt").unwrap(), PathBuf::from("a.txt"));
    }

    #[test]
    fn escaping_entry_names_are_rejected() {
        assert!(matches!(
            entry_relative_path("../evil.sh"),
            Err(ZipError::UnsafeEntryName(_))
        ));
        assert!(matches!(
            entry_relative_path("/etc/passwd"),
            Err(ZipError::UnsafeEntryName(_))
        ));
        assert!(matches!(
            entry_relative_path("a/../../b"),
            Err(ZipError::UnsafeEntryName(_))
        ));
    }
}
