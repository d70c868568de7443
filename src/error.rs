//! Error types surfaced by [`LogManager`](crate::manager::LogManager).
//!
//! Mirrors the shape of the host framework's `HandlerError` (a `thiserror`
//! enum with a catch-all `Message` style variant kept out, since every
//! failure here has a concrete cause).

use thiserror::Error;

/// One I/O stage of [`write_to_disk`](crate::manager::worker) failing.
///
/// Kept separate from [`LogError`] and `Clone` so a single failed flush cycle
/// can broadcast the same outcome to every waiter attached to it.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IoStageError {
    #[error("write failed: {0}")]
    Write(String),
    #[error("flush failed: {0}")]
    Flush(String),
    #[error("sync failed: {0}")]
    Sync(String),
}

/// Errors surfaced from [`LogManager::write`](crate::manager::LogManager::write).
#[non_exhaustive]
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LogError {
    /// No sink has been configured via `set_file`.
    #[error("no file configured for the audit log")]
    NoFile,
    /// The record is larger than the buffer could ever hold.
    #[error("record of {size} bytes does not fit in a buffer of capacity {capacity}")]
    RecordTooLarge { size: usize, capacity: usize },
    /// The flush cycle this record was appended into failed to reach stable storage.
    #[error("fsync failed: {0}")]
    FsyncFailed(#[source] IoStageError),
    /// The manager was stopped while a producer was blocked.
    #[error("shutdown requested while a write was in progress")]
    ShutdownDuringWrite,
}

/// A record could spin a producer forever against a buffer it can never fit
/// into; reject it up front instead.
pub(crate) fn check_record_size(len: usize, capacity: usize) -> Result<(), LogError> {
    if len >= capacity {
        Err(LogError::RecordTooLarge {
            size: len,
            capacity,
        })
    } else {
        Ok(())
    }
}
