//! POSIX storage backend
//!
//! Drives a regular file through blocking pread/pwrite syscalls, the baseline
//! transport that works on every platform and filesystem. Positioned IO keeps
//! the file offset untouched, so concurrent tasks can drive disjoint regions
//! of the same shared file without coordinating.
//!
//! Partial transfers from the kernel are retried until the full requested
//! amount moves or a real error occurs; a write or read that cannot make
//! progress is surfaced as a short transfer, never papered over.

use super::{BackendError, IoDirection, OpenMode, StorageBackend};
use std::fs::{File, OpenOptions};
use std::os::unix::io::AsRawFd;

/// File-backed backend using pread/pwrite
pub struct PosixBackend {
    /// Open target (None when closed)
    file: Option<File>,
}

impl PosixBackend {
    /// Create a new backend with no open target
    pub fn new() -> Self {
        Self { file: None }
    }

    fn fd(&self) -> Result<i32, BackendError> {
        self.file
            .as_ref()
            .map(|f| f.as_raw_fd())
            .ok_or(BackendError::NotOpen)
    }
}

impl Default for PosixBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl StorageBackend for PosixBackend {
    fn open_target(&mut self, identifier: &str, mode: OpenMode) -> Result<(), BackendError> {
        let result = match mode {
            OpenMode::Create => OpenOptions::new()
                .read(true)
                .write(true)
                .create(true)
                .open(identifier),
            OpenMode::Read => OpenOptions::new().read(true).open(identifier),
        };

        match result {
            Ok(file) => {
                self.file = Some(file);
                Ok(())
            }
            Err(source) => Err(BackendError::Open {
                identifier: identifier.to_string(),
                source,
            }),
        }
    }

    fn write_at(&mut self, offset: u64, data: &[u8]) -> Result<usize, BackendError> {
        let fd = self.fd()?;
        let mut total = 0;

        while total < data.len() {
            let remaining = &data[total..];
            let current_offset = offset + total as u64;

            // SAFETY: the slice is valid for the duration of the call and the
            // fd is owned by this backend.
            let result = unsafe {
                libc::pwrite(
                    fd,
                    remaining.as_ptr() as *const libc::c_void,
                    remaining.len(),
                    current_offset as i64,
                )
            };

            if result < 0 {
                return Err(BackendError::Io {
                    direction: IoDirection::Write,
                    offset: current_offset,
                    source: std::io::Error::last_os_error(),
                });
            }
            if result == 0 {
                // No forward progress; report the short write instead of spinning.
                return Err(BackendError::ShortTransfer {
                    direction: IoDirection::Write,
                    offset,
                    expected: data.len(),
                    actual: total,
                });
            }
            total += result as usize;
        }

        Ok(total)
    }

    fn read_at(&mut self, offset: u64, buffer: &mut [u8]) -> Result<usize, BackendError> {
        let fd = self.fd()?;
        let expected = buffer.len();
        let mut total = 0;

        while total < expected {
            let remaining = &mut buffer[total..];
            let current_offset = offset + total as u64;

            // SAFETY: the slice is valid for the duration of the call and the
            // fd is owned by this backend.
            let result = unsafe {
                libc::pread(
                    fd,
                    remaining.as_mut_ptr() as *mut libc::c_void,
                    remaining.len(),
                    current_offset as i64,
                )
            };

            if result < 0 {
                return Err(BackendError::Io {
                    direction: IoDirection::Read,
                    offset: current_offset,
                    source: std::io::Error::last_os_error(),
                });
            }
            if result == 0 {
                // EOF before the transfer filled: the target is smaller than
                // the pattern expects, which is a hard error for this engine.
                return Err(BackendError::ShortTransfer {
                    direction: IoDirection::Read,
                    offset,
                    expected,
                    actual: total,
                });
            }
            total += result as usize;
        }

        Ok(total)
    }

    fn sync_target(&mut self) -> Result<(), BackendError> {
        let fd = self.fd()?;

        // SAFETY: fsync only requires a valid fd
        let result = unsafe { libc::fsync(fd) };
        if result < 0 {
            return Err(BackendError::Sync {
                source: std::io::Error::last_os_error(),
            });
        }
        Ok(())
    }

    fn close_target(&mut self) -> Result<(), BackendError> {
        // Dropping the File closes the fd; a second call finds None and is a no-op.
        self.file = None;
        Ok(())
    }
}
