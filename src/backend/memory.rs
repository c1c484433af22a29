//! In-memory storage backend
//!
//! Holds the whole target in a growable buffer. Used for dry runs (`-a
//! memory`) and throughout the test suite, where its fault-injection knobs
//! simulate open failures, mid-run write errors, short transfers and sync
//! failures without touching a filesystem.
//!
//! Clones share the same underlying target and fault plan, so a test can keep
//! a handle while the executor owns the boxed backend, then inspect or
//! corrupt the stored bytes between phases.

use super::{BackendError, IoDirection, OpenMode, StorageBackend};
use std::io;
use std::sync::{Arc, Mutex};

#[derive(Debug, Default)]
struct Inner {
    /// Target contents; grows on writes past the current end
    data: Vec<u8>,
    /// Whether the target is currently open
    open: bool,
    /// Write operations performed so far
    write_ops: usize,
    /// Fail the next open_target call
    fail_open: bool,
    /// Fail the write with this zero-based op index
    fail_write_at: Option<usize>,
    /// Truncate the write with this zero-based op index to this many bytes
    short_write_at: Option<(usize, usize)>,
    /// Fail every sync_target call
    fail_sync: bool,
}

/// Growable in-memory backend with fault injection
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryBackend {
    /// Create a new backend with an empty target and no faults armed
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm a failure for the next open_target call
    pub fn set_fail_open(&self, fail: bool) {
        self.inner.lock().unwrap().fail_open = fail;
    }

    /// Arm a hard failure for the write with the given zero-based op index
    pub fn fail_write_at(&self, op_index: usize) {
        self.inner.lock().unwrap().fail_write_at = Some(op_index);
    }

    /// Arm a short write: the given op transfers only `bytes` bytes
    pub fn short_write_at(&self, op_index: usize, bytes: usize) {
        self.inner.lock().unwrap().short_write_at = Some((op_index, bytes));
    }

    /// Arm a failure for every sync_target call
    pub fn set_fail_sync(&self, fail: bool) {
        self.inner.lock().unwrap().fail_sync = fail;
    }

    /// Flip one stored byte, simulating on-media corruption
    pub fn corrupt_byte(&self, offset: u64) {
        let mut inner = self.inner.lock().unwrap();
        let idx = offset as usize;
        if idx < inner.data.len() {
            inner.data[idx] ^= 0xFF;
        }
    }

    /// Current target length in bytes
    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().data.len()
    }

    /// Whether the target holds no bytes
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl StorageBackend for MemoryBackend {
    fn open_target(&mut self, identifier: &str, _mode: OpenMode) -> Result<(), BackendError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.fail_open {
            return Err(BackendError::Open {
                identifier: identifier.to_string(),
                source: io::Error::new(io::ErrorKind::Other, "injected open failure"),
            });
        }
        inner.open = true;
        Ok(())
    }

    fn write_at(&mut self, offset: u64, data: &[u8]) -> Result<usize, BackendError> {
        let mut inner = self.inner.lock().unwrap();
        if !inner.open {
            return Err(BackendError::NotOpen);
        }

        let op_index = inner.write_ops;
        inner.write_ops += 1;

        if inner.fail_write_at == Some(op_index) {
            return Err(BackendError::Io {
                direction: IoDirection::Write,
                offset,
                source: io::Error::new(io::ErrorKind::Other, "injected write failure"),
            });
        }

        let length = match inner.short_write_at {
            Some((idx, bytes)) if idx == op_index => bytes.min(data.len()),
            _ => data.len(),
        };

        let end = offset as usize + length;
        if inner.data.len() < end {
            inner.data.resize(end, 0);
        }
        inner.data[offset as usize..end].copy_from_slice(&data[..length]);
        Ok(length)
    }

    fn read_at(&mut self, offset: u64, buffer: &mut [u8]) -> Result<usize, BackendError> {
        let inner = self.inner.lock().unwrap();
        if !inner.open {
            return Err(BackendError::NotOpen);
        }

        let start = offset as usize;
        let available = inner.data.len().saturating_sub(start);
        if available < buffer.len() {
            return Err(BackendError::ShortTransfer {
                direction: IoDirection::Read,
                offset,
                expected: buffer.len(),
                actual: available,
            });
        }
        buffer.copy_from_slice(&inner.data[start..start + buffer.len()]);
        Ok(buffer.len())
    }

    fn sync_target(&mut self) -> Result<(), BackendError> {
        let inner = self.inner.lock().unwrap();
        if !inner.open {
            return Err(BackendError::NotOpen);
        }
        if inner.fail_sync {
            return Err(BackendError::Sync {
                source: io::Error::new(io::ErrorKind::Other, "injected sync failure"),
            });
        }
        Ok(())
    }

    fn close_target(&mut self) -> Result<(), BackendError> {
        self.inner.lock().unwrap().open = false;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open(backend: &mut MemoryBackend) {
        backend.open_target("mem", OpenMode::Create).unwrap();
    }

    #[test]
    fn test_write_read_round_trip() {
        let mut backend = MemoryBackend::new();
        open(&mut backend);

        backend.write_at(100, b"hello").unwrap();
        let mut buf = [0u8; 5];
        backend.read_at(100, &mut buf).unwrap();
        assert_eq!(&buf, b"hello");
        assert_eq!(backend.len(), 105);
    }

    #[test]
    fn test_short_read_past_end() {
        let mut backend = MemoryBackend::new();
        open(&mut backend);
        backend.write_at(0, b"abc").unwrap();

        let mut buf = [0u8; 10];
        let err = backend.read_at(0, &mut buf).unwrap_err();
        assert!(matches!(
            err,
            BackendError::ShortTransfer {
                direction: IoDirection::Read,
                expected: 10,
                actual: 3,
                ..
            }
        ));
    }

    #[test]
    fn test_injected_open_failure() {
        let mut backend = MemoryBackend::new();
        backend.set_fail_open(true);
        assert!(matches!(
            backend.open_target("mem", OpenMode::Create),
            Err(BackendError::Open { .. })
        ));
    }

    #[test]
    fn test_injected_write_failure() {
        let mut backend = MemoryBackend::new();
        backend.fail_write_at(1);
        open(&mut backend);

        assert!(backend.write_at(0, b"ok").is_ok());
        assert!(matches!(
            backend.write_at(2, b"boom"),
            Err(BackendError::Io { .. })
        ));
        // Later writes succeed again; only the armed op fails.
        assert!(backend.write_at(2, b"ok").is_ok());
    }

    #[test]
    fn test_injected_short_write() {
        let mut backend = MemoryBackend::new();
        backend.short_write_at(0, 3);
        open(&mut backend);

        let written = backend.write_at(0, b"longer than three").unwrap();
        assert_eq!(written, 3);
        assert_eq!(backend.len(), 3);
    }

    #[test]
    fn test_injected_sync_failure() {
        let mut backend = MemoryBackend::new();
        backend.set_fail_sync(true);
        open(&mut backend);
        assert!(matches!(
            backend.sync_target(),
            Err(BackendError::Sync { .. })
        ));
    }

    #[test]
    fn test_corrupt_byte() {
        let mut backend = MemoryBackend::new();
        open(&mut backend);
        backend.write_at(0, &[0x55; 8]).unwrap();
        backend.corrupt_byte(3);

        let mut buf = [0u8; 8];
        backend.read_at(0, &mut buf).unwrap();
        assert_eq!(buf[3], 0xAA);
        assert_eq!(buf[0], 0x55);
    }

    #[test]
    fn test_clone_shares_target() {
        let mut backend = MemoryBackend::new();
        let handle = backend.clone();
        open(&mut backend);
        backend.write_at(0, b"shared").unwrap();
        assert_eq!(handle.len(), 6);
    }

    #[test]
    fn test_close_idempotent() {
        let mut backend = MemoryBackend::new();
        open(&mut backend);
        assert!(backend.close_target().is_ok());
        assert!(backend.close_target().is_ok());
    }
}
