//! Bounded Multi-Producer Multi-Consumer Ring Buffer (lossy on overflow)
//!
//! Satu Mutex menjaga slot, cursor, dan flag `closed`.
//! Dua Condvar: `readable` untuk consumer yang menunggu data,
//! `drained` untuk `close()` yang menunggu buffer kosong.

use std::fmt;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex, MutexGuard};
use tracing::{debug, trace};

use super::error::RingError;

/// State yang dijaga oleh satu lock
struct State<T> {
    // `None` = slot kosong. Occupancy eksplisit, jadi payload "kosong"
    // seperti `()` atau `""` tetap ter-deliver.
    slots: Box<[Option<T>]>,
    // Slot target push berikutnya
    write: usize,
    // Slot target pop berikutnya
    read: usize,
    // Jumlah record yang belum dibaca, 0..=capacity
    len: usize,
    closed: bool,
}

impl<T> State<T> {
    #[inline(always)]
    fn advance(&self, index: usize) -> usize {
        let next = index + 1;
        if next == self.slots.len() {
            0
        } else {
            next
        }
    }

    /// Ambil record paling lama, kosongkan slot-nya, geser read cursor
    #[inline(always)]
    fn take(&mut self) -> Option<T> {
        let value = self.slots[self.read].take()?;
        self.read = self.advance(self.read);
        self.len -= 1;
        Some(value)
    }
}

/// Ring buffer berkapasitas tetap dengan handshake close yang lossless
///
/// - `push` tidak pernah block. Kalau buffer penuh, record paling lama
///   ditimpa dan `push` mengembalikan `true` (satu-satunya sinyal drop).
/// - `pop` block selama buffer kosong dan masih terbuka.
/// - `close` menunggu semua record yang sudah masuk dibaca, baru menutup.
///
/// Semua operasi O(1) di bawah satu lock. Aman dipakai dari banyak thread
/// sekaligus (bungkus dengan `Arc`).
pub struct RingBuff<T> {
    state: Mutex<State<T>>,
    readable: Condvar,
    drained: Condvar,
    capacity: usize,
}

impl<T> RingBuff<T> {
    /// Alokasi buffer dengan `capacity` slot, kedua cursor di slot 0.
    ///
    /// Alokasi hanya terjadi sekali di sini.
    ///
    /// # Errors
    /// [`RingError::InvalidCapacity`] jika `capacity == 0`
    pub fn new(capacity: usize) -> Result<Self, RingError> {
        if capacity == 0 {
            return Err(RingError::InvalidCapacity(capacity));
        }

        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, || None);

        Ok(Self {
            state: Mutex::new(State {
                slots: slots.into_boxed_slice(),
                write: 0,
                read: 0,
                len: 0,
                closed: false,
            }),
            readable: Condvar::new(),
            drained: Condvar::new(),
            capacity,
        })
    }

    /// Push record ke buffer (Producer side)
    ///
    /// Returns `true` jika record lama yang belum dibaca ikut ditimpa.
    /// Setelah `close()`, push jadi no-op dan selalu returns `false`.
    #[inline]
    pub fn push(&self, value: T) -> bool {
        self.try_push(value).unwrap_or(false)
    }

    /// Seperti [`push`](Self::push), tapi record yang ditolak karena buffer
    /// sudah ditutup dikembalikan sebagai `Err(value)`.
    pub fn try_push(&self, value: T) -> Result<bool, T> {
        let mut state = self.state.lock();

        if state.closed {
            return Err(value);
        }

        let write = state.write;
        let overwritten = state.slots[write].is_some();

        // Slot terisi hanya kalau buffer penuh, dan saat penuh write == read
        state.slots[write] = Some(value);
        if overwritten {
            state.read = state.advance(state.read);
        } else {
            state.len += 1;
        }
        state.write = state.advance(write);

        self.readable.notify_all();
        trace!(
            write = state.write,
            read = state.read,
            len = state.len,
            overwritten,
            "ring push"
        );

        Ok(overwritten)
    }

    /// Pop record paling lama (Consumer side)
    ///
    /// Record yang masih ada selalu dikembalikan dulu, walaupun buffer sudah
    /// ditutup. Returns `(None, true)` hanya jika buffer kosong dan tertutup.
    /// Kalau kosong dan masih terbuka, block sampai ada `push` atau `close`.
    pub fn pop(&self) -> (Option<T>, bool) {
        let mut state = self.state.lock();
        loop {
            if let Some(popped) = self.pop_locked(&mut state) {
                return popped;
            }
            // Wakeup tidak menjamin ada data: consumer lain bisa lebih dulu
            self.readable.wait(&mut state);
        }
    }

    /// Seperti [`pop`](Self::pop) tapi menyerah setelah `timeout`.
    ///
    /// Timeout yang tidak bisa direpresentasikan sebagai `Instant`
    /// (misalnya `Duration::MAX`) berarti tanpa batas, sama seperti `pop`.
    ///
    /// # Errors
    /// [`RingError::Timeout`] jika buffer masih kosong dan terbuka saat deadline
    pub fn pop_timeout(&self, timeout: Duration) -> Result<(Option<T>, bool), RingError> {
        let mut state = self.state.lock();
        if let Some(popped) = self.pop_locked(&mut state) {
            return Ok(popped);
        }

        let Some(deadline) = Instant::now().checked_add(timeout) else {
            loop {
                self.readable.wait(&mut state);
                if let Some(popped) = self.pop_locked(&mut state) {
                    return Ok(popped);
                }
            }
        };

        loop {
            if self.readable.wait_until(&mut state, deadline).timed_out() {
                return self
                    .pop_locked(&mut state)
                    .ok_or(RingError::Timeout(timeout));
            }
            if let Some(popped) = self.pop_locked(&mut state) {
                return Ok(popped);
            }
        }
    }

    /// Non-blocking pop. Returns `None` jika buffer kosong dan masih terbuka.
    pub fn try_pop(&self) -> Option<(Option<T>, bool)> {
        let mut state = self.state.lock();
        self.pop_locked(&mut state)
    }

    #[inline(always)]
    fn pop_locked(&self, state: &mut MutexGuard<'_, State<T>>) -> Option<(Option<T>, bool)> {
        if let Some(value) = state.take() {
            if state.len == 0 {
                self.drained.notify_all();
            }
            trace!(write = state.write, read = state.read, len = state.len, "ring pop");
            return Some((Some(value), state.closed));
        }

        if state.closed {
            return Some((None, true));
        }

        None
    }

    /// Tutup buffer tanpa membuang record yang sudah masuk.
    ///
    /// 1. Bangunkan semua consumer yang sedang menunggu
    /// 2. Block sampai semua record sudah di-pop
    /// 3. Set `closed`, bangunkan consumer lagi supaya pop di buffer kosong
    ///    langsung returns `(None, true)`
    ///
    /// Idempotent: panggilan kedua langsung returns `Ok(())`.
    /// Tanpa consumer yang aktif, langkah 2 tidak akan pernah selesai.
    pub fn close(&self) -> Result<(), RingError> {
        let mut state = self.state.lock();
        if state.closed {
            return Ok(());
        }

        self.readable.notify_all();

        if state.len > 0 {
            debug!(pending = state.len, "ring close: waiting for consumers to drain");
        }
        while state.len > 0 {
            self.drained.wait(&mut state);
        }

        state.closed = true;
        self.readable.notify_all();
        debug!("ring closed");

        Ok(())
    }

    /// Kapasitas buffer
    #[inline(always)]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Jumlah record yang belum dibaca
    #[inline]
    pub fn len(&self) -> usize {
        self.state.lock().len
    }

    /// Cek apakah buffer kosong
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Cek apakah `close()` sudah selesai
    #[inline]
    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }
}

impl<T> fmt::Debug for RingBuff<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("RingBuff")
            .field("capacity", &self.capacity)
            .field("len", &state.len)
            .field("write", &state.write)
            .field("read", &state.read)
            .field("closed", &state.closed)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_capacity_rejected() {
        let err = RingBuff::<u64>::new(0).unwrap_err();
        assert_eq!(err, RingError::InvalidCapacity(0));
    }

    #[test]
    fn test_basic_push_pop() {
        let rb = RingBuff::new(16).unwrap();

        assert!(rb.is_empty());
        assert!(!rb.push(42u64));
        assert_eq!(rb.len(), 1);

        assert_eq!(rb.pop(), (Some(42), false));
        assert!(rb.is_empty());
    }

    #[test]
    fn test_overwrite_keeps_fifo() {
        let rb = RingBuff::new(3).unwrap();

        assert!(!rb.push('A'));
        assert!(!rb.push('B'));
        assert!(!rb.push('C'));
        assert!(rb.push('D')); // A ditimpa

        assert_eq!(rb.len(), 3);
        assert_eq!(rb.pop(), (Some('B'), false));
        assert_eq!(rb.pop(), (Some('C'), false));
        assert_eq!(rb.pop(), (Some('D'), false));
        assert_eq!(rb.try_pop(), None);
    }

    #[test]
    fn test_capacity_one() {
        let rb = RingBuff::new(1).unwrap();

        assert!(!rb.push(1u8));
        assert!(rb.push(2));
        assert!(rb.push(3));
        assert_eq!(rb.pop(), (Some(3), false));
        assert!(!rb.push(4));
        assert_eq!(rb.pop(), (Some(4), false));
    }

    #[test]
    fn test_wraparound() {
        let rb = RingBuff::new(4).unwrap();

        // Fill and drain multiple times to test wraparound
        for round in 0..10u64 {
            for i in 0..3 {
                assert!(!rb.push(round * 3 + i));
            }
            for i in 0..3 {
                assert_eq!(rb.pop(), (Some(round * 3 + i), false));
            }
        }
    }

    #[test]
    fn test_empty_payload_round_trips() {
        let rb = RingBuff::new(2).unwrap();

        assert!(!rb.push(()));
        assert!(!rb.push(()));
        assert!(rb.push(()));
        assert_eq!(rb.pop(), (Some(()), false));

        let rb = RingBuff::new(2).unwrap();
        rb.push(String::new());
        assert_eq!(rb.pop(), (Some(String::new()), false));
    }

    #[test]
    fn test_close_empty_buffer() {
        let rb = RingBuff::<u32>::new(4).unwrap();

        assert_eq!(rb.close(), Ok(()));
        assert!(rb.is_closed());
        assert_eq!(rb.pop(), (None, true));
        assert_eq!(rb.try_pop(), Some((None, true)));
    }

    #[test]
    fn test_close_is_idempotent() {
        let rb = RingBuff::<u32>::new(4).unwrap();

        assert_eq!(rb.close(), Ok(()));
        assert_eq!(rb.close(), Ok(()));
        assert!(rb.is_closed());
    }

    #[test]
    fn test_push_after_close_is_noop() {
        let rb = RingBuff::new(2).unwrap();
        rb.close().unwrap();

        assert!(!rb.push(1u32));
        assert!(!rb.push(2));
        assert!(!rb.push(3));
        assert_eq!(rb.len(), 0);
        assert_eq!(rb.pop(), (None, true));
    }

    #[test]
    fn test_pop_timeout_on_empty() {
        let rb = RingBuff::<u32>::new(2).unwrap();
        let timeout = Duration::from_millis(20);

        let start = Instant::now();
        assert_eq!(rb.pop_timeout(timeout), Err(RingError::Timeout(timeout)));
        assert!(start.elapsed() >= timeout);
    }

    #[test]
    fn test_pop_timeout_returns_buffered() {
        let rb = RingBuff::new(2).unwrap();
        rb.push(7u32);

        assert_eq!(rb.pop_timeout(Duration::from_millis(1)), Ok((Some(7), false)));
    }

    #[test]
    fn test_pop_timeout_unbounded_duration() {
        let rb = RingBuff::new(2).unwrap();
        rb.push(1u32);

        assert_eq!(rb.pop_timeout(Duration::MAX), Ok((Some(1), false)));

        rb.close().unwrap();
        assert_eq!(rb.pop_timeout(Duration::MAX), Ok((None, true)));
    }

    #[test]
    fn test_try_push_after_close_returns_value() {
        let rb = RingBuff::new(2).unwrap();
        assert_eq!(rb.try_push(1u32), Ok(false));
        assert_eq!(rb.pop(), (Some(1), false));

        rb.close().unwrap();
        assert_eq!(rb.try_push(2), Err(2));
        assert_eq!(rb.len(), 0);
    }

    #[test]
    fn test_invalid_capacity_message() {
        let msg = RingError::InvalidCapacity(0).to_string();
        assert!(msg.contains("at least 1"));
    }
}
