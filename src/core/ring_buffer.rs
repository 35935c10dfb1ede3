//! Blocking SPSC Byte Ring
//!
//! Circular buffer byte dengan kapasitas tetap `C`.
//! - Satu slot selalu kosong: `head == tail` berarti kosong, `tail + 1 == head` berarti penuh
//! - Reader hanya memajukan `head`, writer hanya memajukan `tail`
//! - Writer yang menemukan buffer penuh tidur di Condvar sampai ada ruang atau channel ditutup
//! - Reader tidak pernah tidur: buffer kosong dilaporkan sebagai `WouldBlock`
//! - Tidak ada alokasi setelah inisialisasi

use std::cell::UnsafeCell;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

use log::{debug, trace};

use crate::error::{Error, Result};

/// Padding untuk cache line isolation (64 bytes pada x86-64)
#[repr(C, align(64))]
struct CacheLinePadded<T> {
    value: T,
}

impl<T> CacheLinePadded<T> {
    const fn new(value: T) -> Self {
        Self { value }
    }
}

/// Status akhir dari operasi bulk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Operasi selesai normal (termasuk short read karena buffer kosong sementara)
    Ok,
    /// Stream sudah habis atau channel ditutup
    EndOfStream,
}

/// Hasil `read_block` / `write_block`: jumlah byte yang dipindahkan plus status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transfer {
    pub count: usize,
    pub status: Status,
}

impl Transfer {
    #[inline]
    pub const fn ok(count: usize) -> Self {
        Self {
            count,
            status: Status::Ok,
        }
    }

    #[inline]
    pub const fn end(count: usize) -> Self {
        Self {
            count,
            status: Status::EndOfStream,
        }
    }

    #[inline]
    pub fn is_end_of_stream(&self) -> bool {
        self.status == Status::EndOfStream
    }
}

/// Fixed-capacity circular byte channel
///
/// Satu producer dan satu consumer boleh berjalan bersamaan. Caller tambahan
/// di sisi yang sama diserialisasi oleh lock per sisi (`read_lock` / `write_lock`),
/// sehingga reader dan writer tidak pernah saling menunggu lock.
pub struct RingBuffer {
    // Consumer side - cache line aligned
    head: CacheLinePadded<AtomicUsize>,
    // Producer side - cache line aligned
    tail: CacheLinePadded<AtomicUsize>,
    storage: Box<[UnsafeCell<u8>]>,
    capacity: usize,
    closed: AtomicBool,
    writer_done: AtomicBool,
    read_lock: Mutex<()>,
    write_lock: Mutex<()>,
    // Writer yang menunggu ruang tidur di sini
    space_lock: Mutex<()>,
    space_freed: Condvar,
    writer_waiting: AtomicBool,
}

// SAFETY: RingBuffer aman untuk Send/Sync karena:
// - Slot `head` hanya dibaca di dalam `read_lock`, slot `tail` hanya ditulis di dalam `write_lock`
// - Slot tidak pernah dimiliki kedua sisi sekaligus (satu slot selalu kosong)
// - Release/Acquire pada cursor menjamin isi slot terlihat sebelum cursor berpindah
unsafe impl Send for RingBuffer {}
unsafe impl Sync for RingBuffer {}

/// `()` di balik lock tidak bisa rusak, jadi poisoning diabaikan
#[inline]
fn lock(mutex: &Mutex<()>) -> MutexGuard<'_, ()> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl RingBuffer {
    /// Membuat channel dengan kapasitas `capacity` (maksimal `capacity - 1` byte in-flight).
    ///
    /// Alokasi hanya terjadi sekali di sini.
    ///
    /// # Errors
    /// `InvalidArgument` jika `capacity < 2`: kapasitas 1 tidak punya slot yang bisa dipakai.
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity < 2 {
            return Err(Error::InvalidArgument(format!(
                "capacity must be at least 2, got {}",
                capacity
            )));
        }

        let storage: Box<[UnsafeCell<u8>]> = (0..capacity).map(|_| UnsafeCell::new(0)).collect();

        debug!(
            "ring buffer created: capacity={} usable={}",
            capacity,
            capacity - 1
        );

        Ok(Self {
            head: CacheLinePadded::new(AtomicUsize::new(0)),
            tail: CacheLinePadded::new(AtomicUsize::new(0)),
            storage,
            capacity,
            closed: AtomicBool::new(false),
            writer_done: AtomicBool::new(false),
            read_lock: Mutex::new(()),
            write_lock: Mutex::new(()),
            space_lock: Mutex::new(()),
            space_freed: Condvar::new(),
            writer_waiting: AtomicBool::new(false),
        })
    }

    #[inline(always)]
    fn advance(&self, index: usize) -> usize {
        let next = index + 1;
        if next == self.capacity {
            0
        } else {
            next
        }
    }

    /// Jumlah byte yang belum dibaca, selalu di `[0, capacity - 1]`
    #[inline]
    pub fn len(&self) -> usize {
        let head = self.head.value.load(Ordering::Acquire);
        let tail = self.tail.value.load(Ordering::Acquire);
        if tail >= head {
            tail - head
        } else {
            self.capacity - head + tail
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        let tail = self.tail.value.load(Ordering::Acquire);
        self.advance(tail) == self.head.value.load(Ordering::Acquire)
    }

    /// `capacity - len()`. Satu dari slot ini adalah slot cadangan.
    #[inline]
    pub fn free_space(&self) -> usize {
        self.capacity - self.len()
    }

    #[inline]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// `true` setelah `finish()`: producer tidak akan menulis lagi
    #[inline]
    pub fn is_finished(&self) -> bool {
        self.writer_done.load(Ordering::Acquire)
    }

    /// Pop satu byte. Caller harus memegang `read_lock`.
    #[inline]
    fn pop_locked(&self) -> Result<u8> {
        if self.closed.load(Ordering::Acquire) {
            return Err(Error::EndOfStream);
        }

        // writer_done dibaca sebelum tail: kalau flag sudah terlihat, byte terakhir juga
        let done = self.writer_done.load(Ordering::Acquire);
        let head = self.head.value.load(Ordering::Relaxed);
        let tail = self.tail.value.load(Ordering::Acquire);

        if head == tail {
            return Err(if done {
                Error::EndOfStream
            } else {
                Error::WouldBlock
            });
        }

        // SAFETY: slot `head` sudah dipublish oleh writer (Acquire pada tail)
        // dan writer tidak akan menyentuhnya sampai head maju.
        let byte = unsafe { *self.storage[head].get() };

        self.head.value.store(self.advance(head), Ordering::SeqCst);

        Ok(byte)
    }

    /// Push satu byte. Caller harus memegang `write_lock`.
    #[inline]
    fn push_locked(&self, byte: u8) -> Result<()> {
        if self.closed.load(Ordering::Acquire) || self.writer_done.load(Ordering::Acquire) {
            return Err(Error::EndOfStream);
        }

        let tail = self.tail.value.load(Ordering::Relaxed);
        let next = self.advance(tail);

        if next == self.head.value.load(Ordering::Acquire) {
            self.wait_for_space(next)?;
        }

        // SAFETY: slot `tail` kosong (next != head) dan reader tidak membacanya
        // sebelum tail di-publish di bawah.
        unsafe {
            *self.storage[tail].get() = byte;
        }

        self.tail.value.store(next, Ordering::Release);

        Ok(())
    }

    /// Tidur sampai `head` bergeser dari `next` atau channel ditutup.
    ///
    /// `writer_waiting` dan `head` sama-sama SeqCst: reader yang tidak melihat
    /// flag ini dijamin sudah memajukan head sebelum writer mengecek.
    #[cold]
    fn wait_for_space(&self, next: usize) -> Result<()> {
        trace!("writer blocked: buffer full");

        let mut guard = lock(&self.space_lock);
        self.writer_waiting.store(true, Ordering::SeqCst);

        let result = loop {
            if self.closed.load(Ordering::SeqCst) {
                break Err(Error::EndOfStream);
            }
            if self.head.value.load(Ordering::SeqCst) != next {
                break Ok(());
            }
            guard = self
                .space_freed
                .wait(guard)
                .unwrap_or_else(PoisonError::into_inner);
        };

        self.writer_waiting.store(false, Ordering::SeqCst);
        drop(guard);

        trace!("writer resumed: {}", if result.is_ok() { "space freed" } else { "closed" });
        result
    }

    /// Bangunkan writer setelah reader membebaskan slot
    #[inline]
    fn wake_writer(&self) {
        if self.writer_waiting.load(Ordering::SeqCst) {
            // Ambil lock dulu supaya notify tidak jatuh di antara cek dan wait milik writer
            drop(lock(&self.space_lock));
            self.space_freed.notify_one();
        }
    }

    /// Baca satu byte tanpa pernah tidur.
    ///
    /// # Errors
    /// - `EndOfStream`: channel ditutup, atau producer selesai dan buffer kosong
    /// - `WouldBlock`: buffer kosong tapi producer belum selesai
    pub fn read_byte(&self) -> Result<u8> {
        let _guard = lock(&self.read_lock);
        let byte = self.pop_locked()?;
        self.wake_writer();
        Ok(byte)
    }

    /// Tulis satu byte, tidur selama buffer penuh.
    ///
    /// # Errors
    /// `EndOfStream` jika channel ditutup (juga saat sedang menunggu)
    /// atau producer sudah `finish()`.
    pub fn write_byte(&self, byte: u8) -> Result<()> {
        let _guard = lock(&self.write_lock);
        self.push_locked(byte)
    }

    /// Isi `buf` sebanyak mungkin tanpa tidur.
    ///
    /// Short read dengan `Status::Ok` berarti buffer kosong untuk sementara,
    /// bukan end-of-stream.
    pub fn read_block(&self, buf: &mut [u8]) -> Transfer {
        if buf.is_empty() {
            return Transfer::ok(0);
        }

        let _guard = lock(&self.read_lock);
        let mut filled = 0;

        let status = loop {
            if filled == buf.len() {
                break Status::Ok;
            }
            match self.pop_locked() {
                Ok(byte) => {
                    buf[filled] = byte;
                    filled += 1;
                }
                Err(Error::EndOfStream) => break Status::EndOfStream,
                Err(_) => break Status::Ok,
            }
        };

        if filled > 0 {
            self.wake_writer();
        }

        Transfer {
            count: filled,
            status,
        }
    }

    /// Tulis seluruh `data`, tidur setiap kali buffer penuh.
    ///
    /// Berhenti di byte pertama yang ditolak (channel ditutup) dan melaporkan
    /// jumlah byte yang sudah masuk.
    pub fn write_block(&self, data: &[u8]) -> Transfer {
        if self.is_closed() {
            return Transfer::end(0);
        }

        let _guard = lock(&self.write_lock);

        for (written, &byte) in data.iter().enumerate() {
            if self.push_locked(byte).is_err() {
                return Transfer::end(written);
            }
        }

        Transfer::ok(data.len())
    }

    /// Tandai producer selesai. Reader akan menghabiskan sisa byte lalu melihat `EndOfStream`.
    pub fn finish(&self) {
        if !self.writer_done.swap(true, Ordering::AcqRel) {
            debug!("ring buffer finished: {} bytes left to drain", self.len());
        }
    }

    /// Tutup channel. Idempotent; writer yang sedang menunggu ruang ikut dilepas.
    pub fn close(&self) {
        if !self.closed.swap(true, Ordering::SeqCst) {
            debug!("ring buffer closed: {} unread bytes dropped", self.len());
        }

        drop(lock(&self.space_lock));
        self.space_freed.notify_all();
    }
}

impl fmt::Debug for RingBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RingBuffer")
            .field("capacity", &self.capacity)
            .field("len", &self.len())
            .field("closed", &self.is_closed())
            .field("finished", &self.is_finished())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use std::time::{Duration, Instant};

    /// Tunggu sampai kondisi terpenuhi (maks 2 detik)
    fn wait_until(mut cond: impl FnMut() -> bool) {
        let deadline = Instant::now() + Duration::from_secs(2);
        while !cond() {
            assert!(Instant::now() < deadline, "condition not reached in time");
            thread::sleep(Duration::from_millis(1));
        }
    }

    #[test]
    fn test_rejects_tiny_capacity() {
        assert!(matches!(RingBuffer::new(0), Err(Error::InvalidArgument(_))));
        assert!(matches!(RingBuffer::new(1), Err(Error::InvalidArgument(_))));
        assert_eq!(RingBuffer::new(2).unwrap().capacity(), 2);
    }

    #[test]
    fn test_basic_write_read() {
        let rb = RingBuffer::new(16).unwrap();

        assert!(rb.is_empty());
        assert!(!rb.is_full());
        assert_eq!(rb.free_space(), 16);

        rb.write_byte(42).unwrap();
        assert_eq!(rb.len(), 1);
        assert_eq!(rb.free_space(), 15);

        assert_eq!(rb.read_byte().unwrap(), 42);
        assert!(rb.is_empty());
    }

    #[test]
    fn test_one_slot_reserved() {
        let rb = RingBuffer::new(4).unwrap();

        assert_eq!(rb.write_block(b"abc"), Transfer::ok(3));
        assert!(rb.is_full());
        assert_eq!(rb.len(), 3);
        assert_eq!(rb.free_space(), 1);
    }

    #[test]
    fn test_wraparound() {
        let rb = RingBuffer::new(5).unwrap();
        let mut buf = [0u8; 4];

        // Fill and drain multiple times to move cursors past the end
        for round in 0..10u8 {
            let data = [round, round + 1, round + 2];
            assert_eq!(rb.write_block(&data), Transfer::ok(3));
            assert_eq!(rb.len(), 3);

            let t = rb.read_block(&mut buf);
            assert_eq!(t, Transfer::ok(3));
            assert_eq!(&buf[..3], &data);
        }
    }

    #[test]
    fn test_len_never_exceeds_usable() {
        let rb = RingBuffer::new(3).unwrap();
        for i in 0..50u8 {
            if rb.is_full() {
                rb.read_byte().unwrap();
            }
            rb.write_byte(i).unwrap();
            assert!(rb.len() <= rb.capacity() - 1);
        }
    }

    #[test]
    fn test_empty_read_is_not_eof() {
        let rb = RingBuffer::new(8).unwrap();
        let mut buf = [0u8; 4];

        assert!(matches!(rb.read_byte(), Err(Error::WouldBlock)));
        assert_eq!(rb.read_block(&mut buf), Transfer::ok(0));
    }

    #[test]
    fn test_zero_length_read() {
        let rb = RingBuffer::new(8).unwrap();
        rb.write_block(b"xy");
        assert_eq!(rb.read_block(&mut []), Transfer::ok(0));
        assert_eq!(rb.len(), 2);
    }

    #[test]
    fn test_finish_then_drain() {
        let rb = RingBuffer::new(8).unwrap();
        assert_eq!(rb.write_block(b"hello"), Transfer::ok(5));
        rb.finish();

        let mut buf = [0u8; 10];
        let t = rb.read_block(&mut buf);
        assert_eq!(t, Transfer::end(5));
        assert_eq!(&buf[..5], b"hello");

        // Sudah habis: EOF seterusnya
        assert!(matches!(rb.read_byte(), Err(Error::EndOfStream)));
        assert_eq!(rb.read_block(&mut buf), Transfer::end(0));
    }

    #[test]
    fn test_write_after_finish() {
        let rb = RingBuffer::new(8).unwrap();
        rb.finish();
        rb.finish();
        assert!(matches!(rb.write_byte(1), Err(Error::EndOfStream)));
        assert_eq!(rb.write_block(b"x"), Transfer::end(0));
        assert!(!rb.is_closed());
    }

    #[test]
    fn test_close_semantics() {
        let rb = RingBuffer::new(8).unwrap();
        rb.write_block(b"abc");
        rb.close();
        rb.close();

        let mut buf = [0u8; 4];
        assert_eq!(rb.write_block(b"more"), Transfer::end(0));
        assert!(matches!(rb.read_byte(), Err(Error::EndOfStream)));
        assert_eq!(rb.read_block(&mut buf), Transfer::end(0));
        // Storage tidak direset
        assert_eq!(rb.len(), 3);
    }

    #[test]
    fn test_blocked_write_resumes_after_read() {
        let rb = Arc::new(RingBuffer::new(4).unwrap());

        rb.write_block(b"ab");
        assert_eq!(rb.len(), 2);
        assert_eq!(rb.read_byte().unwrap(), b'a');
        assert_eq!(rb.len(), 1);

        let writer = {
            let rb = Arc::clone(&rb);
            thread::spawn(move || rb.write_block(b"cde"))
        };

        // "c" dan "d" masuk, "e" menunggu
        wait_until(|| rb.is_full());
        thread::sleep(Duration::from_millis(20));
        assert!(!writer.is_finished());

        assert_eq!(rb.read_byte().unwrap(), b'b');
        assert_eq!(writer.join().unwrap(), Transfer::ok(3));

        let mut buf = [0u8; 8];
        assert_eq!(rb.read_block(&mut buf), Transfer::ok(3));
        assert_eq!(&buf[..3], b"cde");
    }

    #[test]
    fn test_close_releases_blocked_writer() {
        let rb = Arc::new(RingBuffer::new(4).unwrap());

        let writer = {
            let rb = Arc::clone(&rb);
            thread::spawn(move || rb.write_block(b"wxyz"))
        };

        wait_until(|| rb.is_full());
        thread::sleep(Duration::from_millis(20));
        assert!(!writer.is_finished());

        rb.close();
        assert_eq!(writer.join().unwrap(), Transfer::end(3));
    }

    #[test]
    fn test_write_byte_blocks_until_space() {
        let rb = Arc::new(RingBuffer::new(2).unwrap());
        rb.write_byte(1).unwrap();

        let writer = {
            let rb = Arc::clone(&rb);
            thread::spawn(move || rb.write_byte(2))
        };

        thread::sleep(Duration::from_millis(20));
        assert!(!writer.is_finished());

        assert_eq!(rb.read_byte().unwrap(), 1);
        writer.join().unwrap().unwrap();
        assert_eq!(rb.read_byte().unwrap(), 2);
    }
}
