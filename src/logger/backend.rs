//! Interface log backend (consumer akhir ring buffer)

use std::io::{self, Write};

use super::LogMessage;

/// Backend yang menerima record dari ring buffer.
///
/// Retry/backoff ke sink eksternal adalah urusan implementasi backend.
pub trait Backend: Send {
    /// Nama backend untuk log/diagnostik
    fn name(&self) -> &str;

    /// Tulis satu record
    fn write_message(&mut self, msg: &LogMessage) -> io::Result<()>;

    /// Dipanggil sekali setelah ring buffer ditutup dan kosong
    fn close(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<B: Backend + ?Sized> Backend for Box<B> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn write_message(&mut self, msg: &LogMessage) -> io::Result<()> {
        (**self).write_message(msg)
    }

    fn close(&mut self) -> io::Result<()> {
        (**self).close()
    }
}

/// Backend yang membuang semua record (driver `none`)
#[derive(Debug, Default, Clone, Copy)]
pub struct DiscardBackend;

impl Backend for DiscardBackend {
    fn name(&self) -> &str {
        "none"
    }

    #[inline(always)]
    fn write_message(&mut self, _msg: &LogMessage) -> io::Result<()> {
        Ok(())
    }
}

/// Backend generik di atas `Write` (stdout, buffer test, dsb)
///
/// Setiap record ditulis apa adanya, newline ditambahkan kalau belum ada.
pub struct WriterBackend<W: Write + Send> {
    writer: W,
    name: String,
}

impl<W: Write + Send> WriterBackend<W> {
    pub fn new(name: impl Into<String>, writer: W) -> Self {
        Self {
            writer,
            name: name.into(),
        }
    }

    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write + Send> Backend for WriterBackend<W> {
    fn name(&self) -> &str {
        &self.name
    }

    fn write_message(&mut self, msg: &LogMessage) -> io::Result<()> {
        self.writer.write_all(&msg.line)?;
        if msg.line.last() != Some(&b'\n') {
            self.writer.write_all(b"\n")?;
        }
        Ok(())
    }

    fn close(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}
