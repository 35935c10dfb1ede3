//! Error types untuk channel dan prompt
//!
//! Semua kondisi adalah bagian dari lifecycle stream biasa:
//! - `EndOfStream`: permanen, tidak ada byte lagi
//! - `WouldBlock`: sementara, coba lagi nanti
//! - `InvalidArgument`: caller salah pakai

use std::io;
use std::sync::Arc;
use thiserror::Error;

/// Crate error type
#[derive(Error, Debug, Clone)]
pub enum Error {
    /// Stream selesai: channel ditutup, atau producer selesai dan buffer kosong
    #[error("end of stream")]
    EndOfStream,

    /// Belum ada byte yang bisa dibaca saat ini
    #[error("no byte available now")]
    WouldBlock,

    /// Argumen tidak valid (capacity, mask, ...)
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// I/O error dari terminal atau reader
    #[error("I/O error: {0}")]
    Io(Arc<io::Error>),

    /// Input tidak bisa di-parse ke tipe yang diminta
    #[error("cannot parse {value:?} as {kind}")]
    Parse { value: String, kind: &'static str },
}

impl Error {
    /// `true` untuk kondisi yang tidak akan berubah (stream sudah habis)
    #[inline]
    pub fn is_end_of_stream(&self) -> bool {
        matches!(self, Error::EndOfStream)
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::UnexpectedEof => Error::EndOfStream,
            io::ErrorKind::WouldBlock => Error::WouldBlock,
            _ => Error::Io(Arc::new(err)),
        }
    }
}

impl From<Error> for io::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::EndOfStream => io::Error::new(io::ErrorKind::UnexpectedEof, err),
            Error::WouldBlock => io::Error::new(io::ErrorKind::WouldBlock, err),
            Error::InvalidArgument(_) | Error::Parse { .. } => {
                io::Error::new(io::ErrorKind::InvalidInput, err)
            }
            Error::Io(inner) => io::Error::new(inner.kind(), inner.to_string()),
        }
    }
}

/// Result type untuk operasi stario
pub type Result<T> = std::result::Result<T, Error>;
