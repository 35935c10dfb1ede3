//! Core module: Blocking SPSC byte channel
//!
//! Prinsip desain:
//! - Fixed capacity: storage dialokasikan sekali, tidak pernah resize
//! - Satu writer, satu reader: cursor masing-masing hanya dimajukan satu sisi
//! - Backpressure: writer tidur saat penuh, reader tidak pernah tidur

mod ring_buffer;
mod stream;

pub use ring_buffer::{RingBuffer, Status, Transfer};
pub use stream::{pipe, ByteReader, ByteWriter, Lifecycle, Sink, Source};
