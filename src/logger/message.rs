//! Satu record output container

use std::time::SystemTime;

/// Stream asal record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamKind {
    Stdout,
    Stderr,
}

impl StreamKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Stdout => "stdout",
            Self::Stderr => "stderr",
        }
    }
}

/// Record yang lewat ring buffer, satu per baris output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogMessage {
    pub stream: StreamKind,
    /// Isi baris, termasuk newline jika ada
    pub line: Vec<u8>,
    pub timestamp: SystemTime,
}

impl LogMessage {
    #[inline]
    pub fn new(stream: StreamKind, line: Vec<u8>) -> Self {
        Self {
            stream,
            line,
            timestamp: SystemTime::now(),
        }
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.line.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.line.is_empty()
    }
}
