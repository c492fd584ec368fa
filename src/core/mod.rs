//! Core module: Ring buffer antara container output dan log backend
//!
//! Prinsip desain:
//! - Producer tidak pernah block: buffer penuh = record paling lama ditimpa
//! - Consumer tidur di Condvar, bukan spin
//! - Close tidak pernah membuang record yang sudah masuk buffer

mod error;
mod ring_buffer;

pub use error::RingError;
pub use ring_buffer::RingBuff;
