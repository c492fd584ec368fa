//! containerio - Buffer antara output container dan log backend
//!
//! Arsitektur:
//! - `core`: Ring buffer lossy-on-overflow dengan close yang lossless
//! - `logger`: Konfigurasi driver, metadata container, trait `Backend`
//! - `pump`: Producer (stream reader) + consumer thread (backend writer)
//!
//! ```
//! use containerio::core::RingBuff;
//!
//! let rb = RingBuff::new(3).unwrap();
//! rb.push("A");
//! rb.push("B");
//! rb.push("C");
//! assert!(rb.push("D")); // A ditimpa
//! assert_eq!(rb.pop(), (Some("B"), false));
//! ```

pub mod core;
pub mod logger;
pub mod pump;

pub use crate::core::{RingBuff, RingError};
pub use crate::logger::{Backend, LogConfig, LogDriver, LogMessage, LoggerInfo, StreamKind};
pub use crate::pump::{LogPump, Producer, PumpError, StatsSnapshot};
