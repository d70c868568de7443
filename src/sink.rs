//! The destination capability the [`FlushWorker`](crate::manager::worker) writes to.
//!
//! `LogManager` never touches the filesystem directly; it only knows about a
//! `{write, flush, sync}` capability set. This is what lets the worker's
//! failure-handling paths be tested without real disk I/O.

use std::fs::File;
use std::io::{self, Write};

/// Destination for flushed buffer bytes.
///
/// Implementations are driven exclusively by the flush worker thread; a
/// `LogManager`'s producer-facing `write` never calls through this trait.
pub trait LogSink: Send {
    /// Write the full contents of `buf` to the sink.
    fn write_all(&mut self, buf: &[u8]) -> io::Result<()>;
    /// Flush any userspace buffering.
    fn flush(&mut self) -> io::Result<()>;
    /// Sync previously written and flushed bytes to stable storage.
    fn sync_all(&mut self) -> io::Result<()>;
}

impl LogSink for File {
    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        Write::write_all(self, buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Write::flush(self)
    }

    fn sync_all(&mut self) -> io::Result<()> {
        File::sync_all(self)
    }
}

#[cfg(any(test, feature = "test-util"))]
pub mod test_doubles {
    //! Sinks for exercising `LogManager`'s failure-handling paths without disk I/O.
    use super::*;
    use std::sync::{Arc, Mutex};

    /// An in-memory sink that records everything written to it.
    #[derive(Clone, Default)]
    pub struct RecordingSink {
        bytes: Arc<Mutex<Vec<u8>>>,
    }

    impl RecordingSink {
        pub fn new() -> Self {
            Self::default()
        }

        /// Snapshot of everything synced so far, as a `String`.
        pub fn contents(&self) -> String {
            String::from_utf8(self.bytes.lock().expect("lock poisoned").clone())
                .expect("sink contents were not valid UTF-8")
        }
    }

    impl LogSink for RecordingSink {
        fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
            self.bytes.lock().expect("lock poisoned").extend_from_slice(buf);
            Ok(())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }

        fn sync_all(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    /// A sink that fails its first `n` write-stage calls (write/flush/sync, in
    /// that order across separate `write_to_disk` invocations), then behaves
    /// like a [`RecordingSink`].
    pub struct FlakySink {
        inner: RecordingSink,
        failures_remaining: usize,
    }

    impl FlakySink {
        pub fn new(failures: usize) -> Self {
            Self {
                inner: RecordingSink::new(),
                failures_remaining: failures,
            }
        }

        pub fn contents(&self) -> String {
            self.inner.contents()
        }

        fn maybe_fail(&mut self, stage: &'static str) -> io::Result<()> {
            if self.failures_remaining > 0 {
                self.failures_remaining -= 1;
                Err(io::Error::other(format!("injected {stage} failure")))
            } else {
                Ok(())
            }
        }
    }

    impl LogSink for FlakySink {
        fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
            self.maybe_fail("write")?;
            self.inner.write_all(buf)
        }

        fn flush(&mut self) -> io::Result<()> {
            self.inner.flush()
        }

        fn sync_all(&mut self) -> io::Result<()> {
            self.inner.sync_all()
        }
    }
}
