//! Pump: output container -> ring buffer -> log backend
//!
//! Producer (reader stream container) tidak pernah menunggu backend.
//! Consumer berjalan di thread sendiri, pop dalam loop sampai ring ditutup.

mod stats;

use std::io::{self, BufRead};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::core::{RingBuff, RingError};
use crate::logger::{Backend, LogMessage, LoggerInfo, StreamKind};

pub use stats::{PumpStats, StatsSnapshot};

/// Warning overflow dicetak untuk drop pertama lalu setiap N drop
const DROP_WARN_INTERVAL: u64 = 1000;

/// Error dari lifecycle pump
#[derive(Debug, Error)]
pub enum PumpError {
    #[error(transparent)]
    Ring(#[from] RingError),

    #[error("failed to spawn log consumer thread: {0}")]
    Spawn(#[source] io::Error),

    #[error("log consumer thread panicked")]
    ConsumerPanicked,

    #[error("failed to close log backend {backend}: {source}")]
    BackendClose {
        backend: String,
        #[source]
        source: io::Error,
    },
}

/// Handle producer yang bisa di-clone ke thread lain (stdout dan stderr reader)
#[derive(Clone)]
pub struct Producer {
    ring: Arc<RingBuff<LogMessage>>,
    stats: Arc<PumpStats>,
    label: Arc<str>,
}

impl Producer {
    /// Push satu record. Returns `true` jika record lama hilang karena overflow.
    ///
    /// Setelah pump di-shutdown, record ditolak dan dihitung di
    /// `records_rejected` (returns `false`, sama seperti `RingBuff::push`).
    pub fn push(&self, msg: LogMessage) -> bool {
        let overwritten = match self.ring.try_push(msg) {
            Ok(overwritten) => overwritten,
            Err(_) => {
                let rejected = self.stats.record_reject();
                if rejected == 1 || rejected % DROP_WARN_INTERVAL == 0 {
                    warn!(
                        container = %self.label,
                        rejected,
                        "log ring buffer closed, record discarded"
                    );
                }
                return false;
            }
        };
        self.stats.record_push();

        if overwritten {
            let dropped = self.stats.record_drop();
            if dropped == 1 || dropped % DROP_WARN_INTERVAL == 0 {
                warn!(
                    container = %self.label,
                    dropped,
                    capacity = self.ring.capacity(),
                    "log ring buffer overflow, oldest records overwritten"
                );
            }
        }

        overwritten
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// Baca `reader` per baris sampai EOF, satu push per baris.
    ///
    /// Returns jumlah baris yang dibaca.
    pub fn copy_from<R: BufRead>(&self, stream: StreamKind, mut reader: R) -> io::Result<u64> {
        let mut lines = 0u64;
        loop {
            let mut line = Vec::new();
            match reader.read_until(b'\n', &mut line) {
                Ok(0) => break,
                Ok(_) => {
                    self.push(LogMessage::new(stream, line));
                    lines += 1;
                }
                Err(ref e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }

        debug!(container = %self.label, stream = stream.as_str(), lines, "stream reached EOF");
        Ok(lines)
    }
}

/// Hasil akhir consumer thread
enum ConsumerExit {
    /// Ring tertutup dan kosong, berisi hasil `Backend::close`
    Finished(io::Result<()>),
    /// Backend panic; sisa record sudah dibuang supaya `close()` tidak macet
    Panicked,
}

/// Pasangan ring buffer + consumer thread untuk satu container
pub struct LogPump {
    producer: Producer,
    backend_name: String,
    consumer: Option<JoinHandle<ConsumerExit>>,
}

impl LogPump {
    /// Alokasi ring buffer dan jalankan consumer thread.
    pub fn start<B>(capacity: usize, backend: B) -> Result<Self, PumpError>
    where
        B: Backend + 'static,
    {
        Self::spawn("anonymous".into(), capacity, backend)
    }

    /// Seperti [`start`](Self::start), tapi thread dan log diberi label container id.
    pub fn start_for<B>(info: &LoggerInfo, capacity: usize, backend: B) -> Result<Self, PumpError>
    where
        B: Backend + 'static,
    {
        Self::spawn(info.container_id.as_str().into(), capacity, backend)
    }

    fn spawn<B>(label: Arc<str>, capacity: usize, mut backend: B) -> Result<Self, PumpError>
    where
        B: Backend + 'static,
    {
        let ring = Arc::new(RingBuff::new(capacity)?);
        let stats = Arc::new(PumpStats::new());
        let backend_name = backend.name().to_string();

        let consumer = {
            let ring = Arc::clone(&ring);
            let stats = Arc::clone(&stats);
            let label = Arc::clone(&label);
            thread::Builder::new()
                .name(format!("log-pump-{}", short_id(&label)))
                .spawn(move || consume(&ring, &mut backend, &stats, &label))
                .map_err(PumpError::Spawn)?
        };

        info!(container = %label, backend = %backend_name, capacity, "log pump started");

        Ok(Self {
            producer: Producer { ring, stats, label },
            backend_name,
            consumer: Some(consumer),
        })
    }

    pub fn producer(&self) -> Producer {
        self.producer.clone()
    }

    /// Shortcut untuk `producer().copy_from(..)`
    pub fn copy_from<R: BufRead>(&self, stream: StreamKind, reader: R) -> io::Result<u64> {
        self.producer.copy_from(stream, reader)
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.producer.stats.snapshot()
    }

    /// Tutup ring (semua record yang sudah masuk tetap ditulis),
    /// tunggu consumer selesai, lalu returns counter akhir.
    pub fn shutdown(mut self) -> Result<StatsSnapshot, PumpError> {
        self.finish()?;
        let snapshot = self.stats();
        info!(
            container = %self.producer.label,
            written = snapshot.records_written,
            dropped = snapshot.records_dropped,
            "log pump stopped"
        );
        Ok(snapshot)
    }

    fn finish(&mut self) -> Result<(), PumpError> {
        let Some(consumer) = self.consumer.take() else {
            return Ok(());
        };

        self.producer.ring.close()?;

        match consumer.join() {
            Ok(ConsumerExit::Finished(Ok(()))) => Ok(()),
            Ok(ConsumerExit::Finished(Err(source))) => Err(PumpError::BackendClose {
                backend: self.backend_name.clone(),
                source,
            }),
            Ok(ConsumerExit::Panicked) | Err(_) => Err(PumpError::ConsumerPanicked),
        }
    }
}

impl Drop for LogPump {
    fn drop(&mut self) {
        if let Err(err) = self.finish() {
            error!(container = %self.producer.label, %err, "log pump shutdown failed");
        }
    }
}

/// Consumer thread: tulis record ke backend sampai ring kosong dan tertutup.
///
/// Kalau backend panic, consumer tetap pop (dan membuang) record sampai ring
/// ditutup. Tanpa itu `close()` di sisi shutdown menunggu selamanya.
fn consume<B: Backend>(
    ring: &RingBuff<LogMessage>,
    backend: &mut B,
    stats: &PumpStats,
    label: &str,
) -> ConsumerExit {
    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        write_records(ring, &mut *backend, stats, label)
    }));

    match result {
        Ok(closed) => ConsumerExit::Finished(closed),
        Err(_) => {
            // Record yang sedang ditulis saat panic ikut hilang
            stats.record_write_error();
            error!(container = label, "log backend panicked, discarding buffered records");

            while let (Some(_), _) = ring.pop() {
                stats.record_write_error();
            }
            ConsumerExit::Panicked
        }
    }
}

fn write_records<B: Backend>(
    ring: &RingBuff<LogMessage>,
    backend: &mut B,
    stats: &PumpStats,
    label: &str,
) -> io::Result<()> {
    loop {
        let msg = match ring.pop() {
            (Some(msg), _) => msg,
            (None, _) => break,
        };

        match backend.write_message(&msg) {
            Ok(()) => stats.record_write(msg.len()),
            Err(err) => {
                stats.record_write_error();
                error!(
                    container = label,
                    backend = backend.name(),
                    %err,
                    "failed to write log record"
                );
            }
        }
    }

    debug!(container = label, backend = backend.name(), "log consumer drained");
    backend.close()
}

fn short_id(id: &str) -> &str {
    id.get(..12).unwrap_or(id)
}
