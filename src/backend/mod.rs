//! Storage backend abstraction
//!
//! A storage backend is the transport the executor drives: it opens a target,
//! performs sized reads and writes at explicit offsets, syncs outstanding
//! writes to stable storage, and closes the target. The executor is written
//! once against this trait and never branches on which variant is active, so
//! a run behaves identically whether the bytes land in a local file, a
//! parallel filesystem mount, or an in-memory buffer.
//!
//! # Lifecycle
//!
//! 1. Create the backend for the configured API (via [`create`])
//! 2. `open_target()` once per run
//! 3. Any number of `write_at()` / `read_at()` / `sync_target()` calls
//! 4. `close_target()` on every exit path, including error paths; closing an
//!    already-closed target is a no-op, never a second error
//!
//! # Thread safety
//!
//! Backends must be `Send` so each task can own its instance on its own
//! thread; they are never shared between tasks.

use crate::config::Api;
use std::fmt;
use thiserror::Error;

pub mod memory;
pub mod posix;

/// Direction of a failed transfer, for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoDirection {
    Read,
    Write,
}

impl fmt::Display for IoDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IoDirection::Read => write!(f, "read"),
            IoDirection::Write => write!(f, "write"),
        }
    }
}

/// Backend failure taxonomy
///
/// `Open` is fatal before any IO happens; `Io`, `ShortTransfer` and `Sync`
/// are fatal to the owning task mid-run. None of these are retried by the
/// executor; retry policy, if any, belongs to a backend variant.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("failed to open target {identifier}: {source}")]
    Open {
        identifier: String,
        source: std::io::Error,
    },

    #[error("{direction} failed at offset {offset}: {source}")]
    Io {
        direction: IoDirection,
        offset: u64,
        source: std::io::Error,
    },

    #[error("short {direction} at offset {offset}: {actual} of {expected} bytes")]
    ShortTransfer {
        direction: IoDirection,
        offset: u64,
        expected: usize,
        actual: usize,
    },

    #[error("sync failed: {source}")]
    Sync { source: std::io::Error },

    #[error("target not open")]
    NotOpen,
}

/// How the target should be opened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenMode {
    /// Create the target if absent and open it for writing and reading
    /// back. Never truncates: concurrent tasks open the same target, and a
    /// late opener must not wipe data already written by its peers.
    Create,
    /// Open an existing target read-only
    Read,
}

/// Capability set the executor needs from a storage transport
pub trait StorageBackend: Send {
    /// Open the target this backend will drive
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Open`] if the target cannot be created or
    /// opened (permissions, missing path, exhausted descriptors).
    fn open_target(&mut self, identifier: &str, mode: OpenMode) -> Result<(), BackendError>;

    /// Write `data` at `offset`, returning the number of bytes written
    ///
    /// A short write is surfaced, never silently treated as success.
    fn write_at(&mut self, offset: u64, data: &[u8]) -> Result<usize, BackendError>;

    /// Read `buffer.len()` bytes at `offset` into `buffer`
    ///
    /// Reaching end-of-target before the buffer is full is a short read and
    /// fails with [`BackendError::ShortTransfer`].
    fn read_at(&mut self, offset: u64, buffer: &mut [u8]) -> Result<usize, BackendError>;

    /// Durability barrier for this task's outstanding writes
    fn sync_target(&mut self) -> Result<(), BackendError>;

    /// Close the target
    ///
    /// Idempotent: closing an already-closed target returns `Ok(())`. The
    /// executor calls this on every exit path, including after failures.
    fn close_target(&mut self) -> Result<(), BackendError>;
}

/// Create the backend variant for the configured API
pub fn create(api: Api) -> Box<dyn StorageBackend> {
    match api {
        Api::Posix => Box::new(posix::PosixBackend::new()),
        Api::Memory => Box::new(memory::MemoryBackend::new()),
    }
}
