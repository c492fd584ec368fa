//! Logger: interface antara ring buffer dan log backend
//!
//! Backend konkret (file, syslog) ada di luar crate ini. Di sini hanya:
//! - Konfigurasi driver dan metadata container
//! - Format record yang lewat ring buffer
//! - Trait `Backend` untuk consumer

mod backend;
mod config;
mod message;

use thiserror::Error;

pub use backend::{Backend, DiscardBackend, WriterBackend};
pub use config::{log_path, ContainerMeta, LogConfig, LogDriver, LoggerInfo, DEFAULT_DAEMON_NAME};
pub use message::{LogMessage, StreamKind};

/// Error konfigurasi logger
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoggerError {
    #[error("log driver {0:?} is not supported")]
    UnsupportedDriver(String),
}
