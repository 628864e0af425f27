use parking_lot::Mutex;
use std::io::{self, Write};

/// A thread-safe byte sink that can be flushed.
pub trait WriteSyncer: Send + Sync {
    fn write_all(&self, buf: &[u8]) -> io::Result<()>;
    fn sync(&self) -> io::Result<()>;
}

/// Accepts and drops everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct Discard;

impl WriteSyncer for Discard {
    fn write_all(&self, _buf: &[u8]) -> io::Result<()> {
        Ok(())
    }

    fn sync(&self) -> io::Result<()> {
        Ok(())
    }
}

/// Serializes writes to an inner `Write` behind a mutex.
#[derive(Debug)]
pub struct LockedWriter<W> {
    inner: Mutex<W>,
}

impl<W: Write + Send> LockedWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner: Mutex::new(inner),
        }
    }

    pub fn into_inner(self) -> W {
        self.inner.into_inner()
    }
}

impl LockedWriter<io::Stderr> {
    pub fn stderr() -> Self {
        Self::new(io::stderr())
    }
}

impl<W: Write + Send> WriteSyncer for LockedWriter<W> {
    fn write_all(&self, buf: &[u8]) -> io::Result<()> {
        self.inner.lock().write_all(buf)
    }

    fn sync(&self) -> io::Result<()> {
        self.inner.lock().flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discard_accepts_everything() {
        let discard = Discard;
        assert!(discard.write_all(b"dropped").is_ok());
        assert!(discard.sync().is_ok());
    }

    #[test]
    fn test_locked_writer_appends() {
        let writer = LockedWriter::new(Vec::new());
        writer.write_all(b"first\n").unwrap();
        writer.write_all(b"second\n").unwrap();
        writer.sync().unwrap();
        assert_eq!(writer.into_inner(), b"first\nsecond\n");
    }
}
