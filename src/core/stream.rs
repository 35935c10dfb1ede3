//! Capability contracts untuk byte channel
//!
//! Tiga peran kecil, bukan satu base class besar:
//! - `Source`: producer mendorong byte masuk
//! - `Sink`: consumer menarik byte keluar
//! - `Lifecycle`: sisi mana pun boleh menutup channel
//!
//! `pipe()` memecah satu channel menjadi `ByteWriter` + `ByteReader`
//! yang masing-masing mengimplementasikan `std::io::Write` / `std::io::Read`.

use std::io;
use std::sync::Arc;

use super::ring_buffer::{RingBuffer, Transfer};
use crate::error::Result;

/// Sisi producer
pub trait Source {
    /// Tulis seluruh `data`, menunggu selama buffer penuh
    fn write_block(&self, data: &[u8]) -> Transfer;

    /// Producer tidak akan menulis lagi
    fn finish(&self);
}

/// Sisi consumer
pub trait Sink {
    /// Baca sebanyak yang tersedia tanpa menunggu
    fn read_block(&self, buf: &mut [u8]) -> Transfer;
}

/// Penutupan channel
pub trait Lifecycle {
    fn close(&self) -> Result<()>;

    fn is_closed(&self) -> bool;
}

impl Source for RingBuffer {
    #[inline]
    fn write_block(&self, data: &[u8]) -> Transfer {
        RingBuffer::write_block(self, data)
    }

    #[inline]
    fn finish(&self) {
        RingBuffer::finish(self)
    }
}

impl Sink for RingBuffer {
    #[inline]
    fn read_block(&self, buf: &mut [u8]) -> Transfer {
        RingBuffer::read_block(self, buf)
    }
}

impl Lifecycle for RingBuffer {
    #[inline]
    fn close(&self) -> Result<()> {
        RingBuffer::close(self);
        Ok(())
    }

    #[inline]
    fn is_closed(&self) -> bool {
        RingBuffer::is_closed(self)
    }
}

/// Membuat channel baru dan memecahnya menjadi writer dan reader.
///
/// Kedua handle berbagi satu `RingBuffer` lewat `Arc`.
pub fn pipe(capacity: usize) -> Result<(ByteWriter, ByteReader)> {
    let shared = Arc::new(RingBuffer::new(capacity)?);
    let writer = ByteWriter {
        inner: Arc::clone(&shared),
    };
    let reader = ByteReader { inner: shared };
    Ok((writer, reader))
}

/// Producer half dari `pipe()`.
///
/// Drop memanggil `finish()`: reader menghabiskan sisa byte lalu melihat EOF.
#[derive(Debug)]
pub struct ByteWriter {
    inner: Arc<RingBuffer>,
}

impl ByteWriter {
    #[inline]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.inner.capacity()
    }

    /// Channel di balik handle ini
    pub fn channel(&self) -> &Arc<RingBuffer> {
        &self.inner
    }
}

impl Source for ByteWriter {
    #[inline]
    fn write_block(&self, data: &[u8]) -> Transfer {
        self.inner.write_block(data)
    }

    #[inline]
    fn finish(&self) {
        self.inner.finish()
    }
}

impl Lifecycle for ByteWriter {
    fn close(&self) -> Result<()> {
        self.inner.close();
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.inner.is_closed()
    }
}

impl io::Write for ByteWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let transfer = self.inner.write_block(buf);
        if transfer.is_end_of_stream() && transfer.count == 0 && !buf.is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "byte channel closed",
            ));
        }
        Ok(transfer.count)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for ByteWriter {
    fn drop(&mut self) {
        self.inner.finish();
    }
}

/// Consumer half dari `pipe()`.
///
/// `io::Read` tidak pernah tidur: buffer kosong menjadi `ErrorKind::WouldBlock`,
/// `Ok(0)` hanya untuk end-of-stream. Drop menutup channel supaya writer
/// yang sedang menunggu ikut lepas.
#[derive(Debug)]
pub struct ByteReader {
    inner: Arc<RingBuffer>,
}

impl ByteReader {
    #[inline]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.inner.capacity()
    }

    pub fn channel(&self) -> &Arc<RingBuffer> {
        &self.inner
    }
}

impl Sink for ByteReader {
    #[inline]
    fn read_block(&self, buf: &mut [u8]) -> Transfer {
        self.inner.read_block(buf)
    }
}

impl Lifecycle for ByteReader {
    fn close(&self) -> Result<()> {
        self.inner.close();
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.inner.is_closed()
    }
}

impl io::Read for ByteReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        let transfer = self.inner.read_block(buf);
        if transfer.count == 0 && !transfer.is_end_of_stream() {
            return Err(io::Error::new(
                io::ErrorKind::WouldBlock,
                "no byte available now",
            ));
        }
        Ok(transfer.count)
    }
}

impl Drop for ByteReader {
    fn drop(&mut self) {
        self.inner.close();
    }
}
