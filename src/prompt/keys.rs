//! Pembaca keystroke: satu karakter UTF-8 per panggilan
//!
//! Reader non-blocking (mis. `ByteReader`) yang mengembalikan `WouldBlock`
//! di-poll ulang setiap `poll_interval`. `Ok(0)` berarti end-of-stream.

use std::io::{self, Read};
use std::thread;
use std::time::Duration;

use crate::error::{Error, Result};

/// Panjang sequence UTF-8 dari leading byte, 0 untuk byte yang tidak valid
#[inline]
fn utf8_width(first: u8) -> usize {
    match first {
        0x00..=0x7F => 1,
        0xC2..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF4 => 4,
        _ => 0,
    }
}

pub(crate) struct KeyReader<R> {
    inner: R,
    poll_interval: Duration,
    // Byte yang sudah terbaca tapi bukan bagian dari karakter sebelumnya
    pending: Option<u8>,
}

impl<R: Read> KeyReader<R> {
    pub(crate) fn new(inner: R, poll_interval: Duration) -> Self {
        Self {
            inner,
            poll_interval,
            pending: None,
        }
    }

    pub(crate) fn into_inner(self) -> R {
        self.inner
    }

    fn read_byte(&mut self) -> Result<u8> {
        if let Some(byte) = self.pending.take() {
            return Ok(byte);
        }

        let mut byte = [0u8; 1];
        loop {
            match self.inner.read(&mut byte) {
                Ok(0) => return Err(Error::EndOfStream),
                Ok(_) => return Ok(byte[0]),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                    thread::sleep(self.poll_interval)
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Sequence yang rusak menjadi U+FFFD
    pub(crate) fn read_char(&mut self) -> Result<char> {
        let first = self.read_byte()?;
        let width = utf8_width(first);

        match width {
            0 => return Ok(char::REPLACEMENT_CHARACTER),
            1 => return Ok(first as char),
            _ => {}
        }

        let mut bytes = [first, 0, 0, 0];
        for slot in bytes.iter_mut().take(width).skip(1) {
            let next = self.read_byte()?;
            if next & 0xC0 != 0x80 {
                self.pending = Some(next);
                return Ok(char::REPLACEMENT_CHARACTER);
            }
            *slot = next;
        }

        Ok(std::str::from_utf8(&bytes[..width])
            .ok()
            .and_then(|s| s.chars().next())
            .unwrap_or(char::REPLACEMENT_CHARACTER))
    }
}
