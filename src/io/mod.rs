mod local;

pub use local::LocalFileReader;

use std::io;

use async_trait::async_trait;

/// Trait for random access reading from an archive source
#[async_trait]
pub trait ReadAt: Send + Sync {
    /// Read data at the specified offset into the buffer, returning the
    /// number of bytes read
    async fn read_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<usize>;

    /// Get the total size of the data source
    fn size(&self) -> u64;

    /// Fill the whole buffer from the specified offset. Archive records
    /// are fixed-size, so a short read is always corruption.
    async fn read_exact_at(&self, mut offset: u64, mut buf: &mut [u8]) -> io::Result<()> {
        while !buf.is_empty() {
            match self.read_at(offset, buf).await? {
                0 => {
                    return Err(io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        "archive ended mid-record",
                    ));
                }
                n => {
                    offset += n as u64;
                    let rest = buf;
                    buf = &mut rest[n..];
                }
            }
        }
        Ok(())
    }
}
