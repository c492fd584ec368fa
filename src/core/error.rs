//! Error types untuk ring buffer

use std::time::Duration;

use thiserror::Error;

/// Error dari operasi [`RingBuff`](super::RingBuff)
///
/// Overflow bukan error: `push` melaporkannya lewat return value `bool`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RingError {
    /// Kapasitas harus minimal 1 slot
    #[error("invalid ring buffer capacity {0}: must be at least 1")]
    InvalidCapacity(usize),

    /// `pop_timeout` habis waktu, buffer masih kosong dan belum ditutup
    #[error("no record available after {0:?}")]
    Timeout(Duration),
}
