use std::io::Cursor;

use byteorder::{LittleEndian, ReadBytesExt};

use super::ZipError;

/// Central Directory File Header signature
pub const CENTRAL_HEADER_SIGNATURE: &[u8] = b"PK\x01\x02";

/// Local File Header signature and fixed size
pub const LOCAL_HEADER_SIGNATURE: &[u8] = b"PK\x03\x04";
pub const LOCAL_HEADER_SIZE: usize = 30;

/// ZIP compression methods
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionMethod {
    Stored,
    Deflate,
    Other(u16),
}

impl CompressionMethod {
    pub fn from_u16(value: u16) -> Self {
        match value {
            0 => CompressionMethod::Stored,
            8 => CompressionMethod::Deflate,
            _ => CompressionMethod::Other(value),
        }
    }
}

/// End of Central Directory (EOCD) - 22 bytes minimum
pub struct EndOfCentralDirectory {
    pub disk_entries: u16,
    pub total_entries: u16,
    pub cd_size: u32,
    pub cd_offset: u32,
}

impl EndOfCentralDirectory {
    pub const SIGNATURE: &'static [u8] = b"PK\x05\x06";
    pub const SIZE: usize = 22;

    pub fn parse(data: &[u8]) -> Result<Self, ZipError> {
        if data.len() < Self::SIZE || &data[0..4] != Self::SIGNATURE {
            return Err(ZipError::Corrupt("bad end of central directory record"));
        }

        let mut cursor = Cursor::new(&data[4..]);
        let _disk_number = cursor.read_u16::<LittleEndian>()?;
        let _disk_with_cd = cursor.read_u16::<LittleEndian>()?;

        Ok(Self {
            disk_entries: cursor.read_u16::<LittleEndian>()?,
            total_entries: cursor.read_u16::<LittleEndian>()?,
            cd_size: cursor.read_u32::<LittleEndian>()?,
            cd_offset: cursor.read_u32::<LittleEndian>()?,
        })
    }

    /// Any field pegged at its maximum means the real value lives in the
    /// ZIP64 record.
    pub fn is_zip64(&self) -> bool {
        self.disk_entries == 0xFFFF
            || self.total_entries == 0xFFFF
            || self.cd_size == 0xFFFFFFFF
            || self.cd_offset == 0xFFFFFFFF
    }
}

/// ZIP64 End of Central Directory Locator - 20 bytes
pub struct Zip64Locator {
    pub eocd64_offset: u64,
}

impl Zip64Locator {
    pub const SIGNATURE: &'static [u8] = b"PK\x06\x07";
    pub const SIZE: usize = 20;

    pub fn parse(data: &[u8]) -> Result<Self, ZipError> {
        if data.len() < Self::SIZE || &data[0..4] != Self::SIGNATURE {
            return Err(ZipError::Corrupt("bad ZIP64 locator record"));
        }

        let mut cursor = Cursor::new(&data[4..]);
        let _disk_with_eocd64 = cursor.read_u32::<LittleEndian>()?;

        Ok(Self {
            eocd64_offset: cursor.read_u64::<LittleEndian>()?,
        })
    }
}

/// ZIP64 End of Central Directory - 56 bytes minimum
pub struct Zip64EndOfCentralDirectory {
    pub total_entries: u64,
    pub cd_size: u64,
    pub cd_offset: u64,
}

impl Zip64EndOfCentralDirectory {
    pub const SIGNATURE: &'static [u8] = b"PK\x06\x06";
    pub const MIN_SIZE: usize = 56;

    pub fn parse(data: &[u8]) -> Result<Self, ZipError> {
        if data.len() < Self::MIN_SIZE || &data[0..4] != Self::SIGNATURE {
            return Err(ZipError::Corrupt("bad ZIP64 end of central directory"));
        }

        let mut cursor = Cursor::new(&data[4..]);
        let _record_size = cursor.read_u64::<LittleEndian>()?;
        let _version_made_by = cursor.read_u16::<LittleEndian>()?;
        let _version_needed = cursor.read_u16::<LittleEndian>()?;
        let _disk_number = cursor.read_u32::<LittleEndian>()?;
        let _disk_with_cd = cursor.read_u32::<LittleEndian>()?;
        let _disk_entries = cursor.read_u64::<LittleEndian>()?;

        Ok(Self {
            total_entries: cursor.read_u64::<LittleEndian>()?,
            cd_size: cursor.read_u64::<LittleEndian>()?,
            cd_offset: cursor.read_u64::<LittleEndian>()?,
        })
    }
}

/// Metadata for one entry, parsed from the Central Directory
#[derive(Debug, Clone)]
pub struct ZipEntry {
    /// Archive-relative entry name, `/`-separated
    pub name: String,
    pub method: CompressionMethod,
    pub compressed_size: u64,
    pub uncompressed_size: u64,
    /// Offset of the entry's Local File Header in the archive
    pub header_offset: u64,
    /// Directory entries end with `/` and carry no data
    pub is_directory: bool,
}
