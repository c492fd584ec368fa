//! Counter untuk pump: record masuk, drop, dan tertulis

use std::sync::atomic::{AtomicU64, Ordering};

/// Counter per pump, di-update lock-free dari producer dan consumer
#[derive(Debug, Default)]
pub struct PumpStats {
    records_pushed: AtomicU64,
    records_dropped: AtomicU64,
    records_rejected: AtomicU64,
    records_written: AtomicU64,
    bytes_written: AtomicU64,
    write_errors: AtomicU64,
}

/// Snapshot counter pada satu titik waktu
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    /// Record yang diterima ring buffer
    pub records_pushed: u64,
    /// Record yang ditimpa sebelum sempat dibaca (overflow)
    pub records_dropped: u64,
    /// Record yang ditolak karena ring sudah ditutup
    pub records_rejected: u64,
    pub records_written: u64,
    pub bytes_written: u64,
    pub write_errors: u64,
}

impl PumpStats {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline(always)]
    pub(crate) fn record_push(&self) {
        self.records_pushed.fetch_add(1, Ordering::Relaxed);
    }

    /// Returns total drop setelah increment
    #[inline(always)]
    pub(crate) fn record_drop(&self) -> u64 {
        self.records_dropped.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Returns total reject setelah increment
    #[inline(always)]
    pub(crate) fn record_reject(&self) -> u64 {
        self.records_rejected.fetch_add(1, Ordering::Relaxed) + 1
    }

    #[inline(always)]
    pub(crate) fn record_write(&self, bytes: usize) {
        self.records_written.fetch_add(1, Ordering::Relaxed);
        self.bytes_written.fetch_add(bytes as u64, Ordering::Relaxed);
    }

    #[inline(always)]
    pub(crate) fn record_write_error(&self) {
        self.write_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            records_pushed: self.records_pushed.load(Ordering::Relaxed),
            records_dropped: self.records_dropped.load(Ordering::Relaxed),
            records_rejected: self.records_rejected.load(Ordering::Relaxed),
            records_written: self.records_written.load(Ordering::Relaxed),
            bytes_written: self.bytes_written.load(Ordering::Relaxed),
            write_errors: self.write_errors.load(Ordering::Relaxed),
        }
    }
}

impl StatsSnapshot {
    /// Total record yang hilang: overflow + ditolak setelah close
    pub fn records_lost(&self) -> u64 {
        self.records_dropped + self.records_rejected
    }

    /// Persentase record yang hilang dari semua yang dikirim producer
    pub fn drop_rate(&self) -> f64 {
        let offered = self.records_pushed + self.records_rejected;
        if offered == 0 {
            return 0.0;
        }
        self.records_lost() as f64 / offered as f64 * 100.0
    }
}
