//! Shared test fixture: a minimal ZIP writer.
//!
//! Builds byte-accurate archives (local headers, central directory,
//! EOCD) so the reader can be exercised against real format layouts
//! without shipping binary fixtures. CRCs are written as zero; the
//! reader does not verify them.

#![allow(dead_code)]

use std::io::Read;

use byteorder::{LittleEndian, WriteBytesExt};
use flate2::Compression;
use flate2::read::DeflateEncoder;

const METHOD_STORED: u16 = 0;
const METHOD_DEFLATE: u16 = 8;

pub struct ZipWriter {
    bytes: Vec<u8>,
    directory: Vec<u8>,
    entries: u16,
}

impl ZipWriter {
    pub fn new() -> Self {
        Self {
            bytes: Vec::new(),
            directory: Vec::new(),
            entries: 0,
        }
    }

    pub fn add_stored(&mut self, name: &str, data: &[u8]) {
        self.add_entry(name, METHOD_STORED, data.len(), data);
    }

    pub fn add_deflated(&mut self, name: &str, data: &[u8]) {
        let compressed = deflate(data);
        self.add_entry(name, METHOD_DEFLATE, data.len(), &compressed);
    }

    /// Explicit directory entry; `name` must end with `/`.
    pub fn add_dir(&mut self, name: &str) {
        assert!(name.ends_with('/'), "directory entries end with a slash");
        self.add_entry(name, METHOD_STORED, 0, &[]);
    }

    /// Entry with an arbitrary compression method code, stored as-is.
    pub fn add_with_method(&mut self, name: &str, method: u16, data: &[u8]) {
        self.add_entry(name, method, data.len(), data);
    }

    fn add_entry(&mut self, name: &str, method: u16, uncompressed_len: usize, stored: &[u8]) {
        let header_offset = self.bytes.len() as u32;

        let b = &mut self.bytes;
        b.extend_from_slice(b"PK\x03\x04");
        b.write_u16::<LittleEndian>(20).unwrap(); // version needed
        b.write_u16::<LittleEndian>(0).unwrap(); // flags
        b.write_u16::<LittleEndian>(method).unwrap();
        b.write_u16::<LittleEndian>(0).unwrap(); // mod time
        b.write_u16::<LittleEndian>(0).unwrap(); // mod date
        b.write_u32::<LittleEndian>(0).unwrap(); // crc32
        b.write_u32::<LittleEndian>(stored.len() as u32).unwrap();
        b.write_u32::<LittleEndian>(uncompressed_len as u32).unwrap();
        b.write_u16::<LittleEndian>(name.len() as u16).unwrap();
        b.write_u16::<LittleEndian>(0).unwrap(); // extra field
        b.extend_from_slice(name.as_bytes());
        b.extend_from_slice(stored);

        let d = &mut self.directory;
        d.extend_from_slice(b"PK\x01\x02");
        d.write_u16::<LittleEndian>(20).unwrap(); // version made by
        d.write_u16::<LittleEndian>(20).unwrap(); // version needed
        d.write_u16::<LittleEndian>(0).unwrap(); // flags
        d.write_u16::<LittleEndian>(method).unwrap();
        d.write_u16::<LittleEndian>(0).unwrap(); // mod time
        d.write_u16::<LittleEndian>(0).unwrap(); // mod date
        d.write_u32::<LittleEndian>(0).unwrap(); // crc32
        d.write_u32::<LittleEndian>(stored.len() as u32).unwrap();
        d.write_u32::<LittleEndian>(uncompressed_len as u32).unwrap();
        d.write_u16::<LittleEndian>(name.len() as u16).unwrap();
        d.write_u16::<LittleEndian>(0).unwrap(); // extra field
        d.write_u16::<LittleEndian>(0).unwrap(); // comment
        d.write_u16::<LittleEndian>(0).unwrap(); // disk number
        d.write_u16::<LittleEndian>(0).unwrap(); // internal attrs
        d.write_u32::<LittleEndian>(0).unwrap(); // external attrs
        d.write_u32::<LittleEndian>(header_offset).unwrap();
        d.extend_from_slice(name.as_bytes());

        self.entries += 1;
    }

    pub fn finish(self) -> Vec<u8> {
        self.finish_with_comment(&[])
    }

    pub fn finish_with_comment(mut self, comment: &[u8]) -> Vec<u8> {
        let cd_offset = self.bytes.len() as u32;
        self.bytes.extend_from_slice(&self.directory);
        let cd_size = self.bytes.len() as u32 - cd_offset;

        let b = &mut self.bytes;
        b.extend_from_slice(b"PK\x05\x06");
        b.write_u16::<LittleEndian>(0).unwrap(); // disk number
        b.write_u16::<LittleEndian>(0).unwrap(); // disk with cd
        b.write_u16::<LittleEndian>(self.entries).unwrap();
        b.write_u16::<LittleEndian>(self.entries).unwrap();
        b.write_u32::<LittleEndian>(cd_size).unwrap();
        b.write_u32::<LittleEndian>(cd_offset).unwrap();
        b.write_u16::<LittleEndian>(comment.len() as u16).unwrap();
        b.extend_from_slice(comment);

        self.bytes
    }
}

/// Raw-deflate a buffer the way zip method 8 stores it.
pub fn deflate(data: &[u8]) -> Vec<u8> {
    let mut encoder = DeflateEncoder::new(data, Compression::default());
    let mut out = Vec::new();
    encoder.read_to_end(&mut out).unwrap();
    out
}
