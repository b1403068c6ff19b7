//! Sink abstraction
//!
//! A sink is anything the rotating writer can write bytes into and close
//! once it is rotated out. No hierarchy is involved: implement `write` and
//! `close` (and optionally `flush`) and the core treats it opaquely.

use std::fs::File;
use std::io::{self, Write};
use std::sync::Arc;

use parking_lot::Mutex;

/// A writable, closable resource
pub trait Sink: Send {
    /// Write bytes, returning how many were accepted
    fn write(&mut self, buf: &[u8]) -> io::Result<usize>;

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }

    /// Release the sink. Called exactly once before it is dropped by the core.
    fn close(&mut self) -> io::Result<()>;
}

impl Sink for File {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Write::write(self, buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Write::flush(self)
    }

    /// Syncs data and metadata to disk
    fn close(&mut self) -> io::Result<()> {
        self.sync_all()
    }
}

impl<S: Sink + ?Sized> Sink for Box<S> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        (**self).write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        (**self).flush()
    }

    fn close(&mut self) -> io::Result<()> {
        (**self).close()
    }
}

/// Adapts any `io::Write` into a sink whose close is a flush
#[derive(Debug)]
pub struct WriterSink<W> {
    writer: W,
}

impl<W: Write + Send> WriterSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write + Send> Sink for WriterSink<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.writer.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }

    fn close(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

#[derive(Debug, Default)]
struct MemoryInner {
    data: Vec<u8>,
    closed: bool,
    fail_close: Option<String>,
}

/// In-memory sink backed by a shared buffer.
/// Cloning creates a new handle to the same underlying data, so a caller
/// can keep one handle for inspection and hand the other to the writer.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    inner: Arc<Mutex<MemoryInner>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `close` fail with `message`
    pub fn fail_on_close(&self, message: impl Into<String>) {
        self.inner.lock().fail_close = Some(message.into());
    }

    /// Copy of everything written so far
    pub fn contents(&self) -> Vec<u8> {
        self.inner.lock().data.clone()
    }

    pub fn contents_string(&self) -> String {
        String::from_utf8_lossy(&self.inner.lock().data).into_owned()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_closed(&self) -> bool {
        self.inner.lock().closed
    }
}

impl Sink for MemorySink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut inner = self.inner.lock();
        if inner.closed {
            return Err(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "write to closed memory sink",
            ));
        }
        inner.data.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn close(&mut self) -> io::Result<()> {
        let mut inner = self.inner.lock();
        if let Some(message) = &inner.fail_close {
            return Err(io::Error::other(message.clone()));
        }
        inner.closed = true;
        Ok(())
    }
}
