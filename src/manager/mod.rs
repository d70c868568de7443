//! Public façade for the audit-log batching engine.
//!
//! `LogManager` accepts records from producer threads, buffers them in a
//! [`DoubleBuffer`], and owns the dedicated flush thread (`worker`) that
//! drains them to a [`LogSink`]. Configuration and worker internals live in
//! submodules and are re-exported here, the way the teacher's
//! `handlers/file` module re-exports its `config`/`worker` submodules.

mod config;
mod state;
pub(crate) mod worker;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use log::{info, warn};
use parking_lot::{Condvar, Mutex};

pub use config::{ManagerConfig, DEFAULT_BUFFER_CAPACITY, DEFAULT_GROUP_FSYNC_PERIOD};

use crate::error::{check_record_size, LogError};
use crate::sink::LogSink;
use state::SharedState;

/// State shared between the public API and the flush worker thread.
pub(crate) struct Shared {
    state: Mutex<SharedState>,
    writer_signal: Condvar,
    fsync_signal: Condvar,
    /// Locked only by the worker for the duration of an I/O call; producers
    /// never touch the sink itself, only `has_sink`.
    sink: Mutex<Option<Box<dyn LogSink>>>,
    has_sink: AtomicBool,
}

/// Double-buffered batching engine sitting between producer threads and one
/// durable log sink.
pub struct LogManager {
    shared: Arc<Shared>,
    worker: Option<JoinHandle<()>>,
}

impl LogManager {
    /// Reserve `capacity` bytes for each of the two buffer slots, using the
    /// default group-fsync period.
    pub fn new(capacity: usize) -> Self {
        Self::with_config(ManagerConfig::with_capacity(capacity))
    }

    pub fn with_config(config: ManagerConfig) -> Self {
        let state = SharedState::new(config.capacity, config.group_fsync_period);
        let shared = Arc::new(Shared {
            state: Mutex::new(state),
            writer_signal: Condvar::new(),
            fsync_signal: Condvar::new(),
            sink: Mutex::new(None),
            has_sink: AtomicBool::new(false),
        });
        Self {
            shared,
            worker: None,
        }
    }

    /// Record the sink handle. Must be called before the first `write`.
    pub fn set_file<S: LogSink + 'static>(&self, sink: S) {
        *self.shared.sink.lock() = Some(Box::new(sink));
        self.shared.has_sink.store(true, Ordering::Release);
    }

    /// Raise both buffer slots' reserved capacity to at least `n`. Safe only
    /// before the worker starts or while quiesced.
    pub fn set_buffer_size(&self, n: usize) {
        self.shared.state.lock().double_buffer.reserve(n);
    }

    /// Change the group-fsync period used for future `next_group_fsync`
    /// deadlines in full-durability mode.
    pub fn set_group_fsync_period(&self, period: Duration) {
        self.shared.state.lock().group_fsync_period = period;
    }

    /// Enable or disable full-durability mode. Idempotent: calling with the
    /// same value twice has the same effect as calling it once.
    pub fn set_full_durability_mode(&self, mode: bool) {
        let mut guard = self.shared.state.lock();
        if mode && !guard.full_durability {
            guard.next_group_fsync = std::time::Instant::now();
        }
        guard.full_durability = mode;
    }

    pub fn is_full_durability_mode(&self) -> bool {
        self.shared.state.lock().full_durability
    }

    pub fn log_buffer_capacity(&self) -> usize {
        self.shared.state.lock().double_buffer.incoming().capacity()
    }

    /// Spawn the flush worker thread. No-op if already running.
    pub fn start_fsync_thread(&mut self) {
        if self.worker.is_some() {
            return;
        }
        let shared = Arc::clone(&self.shared);
        self.worker = Some(std::thread::spawn(move || worker::run(shared)));
    }

    /// Signal the worker to stop and join it. No-op if not running.
    pub fn stop_fsync_thread(&mut self) {
        let Some(handle) = self.worker.take() else {
            return;
        };
        {
            let mut guard = self.shared.state.lock();
            guard.stop = true;
        }
        // Wake the worker out of its timed wait, and release any producers
        // blocked on either condvar so they observe shutdown promptly.
        self.shared.writer_signal.notify_all();
        self.shared.fsync_signal.notify_all();
        if handle.join().is_err() {
            warn!("femto_audit_log: flush worker thread panicked");
        }
    }

    /// Submit a record. Blocks until buffered (or, in full-durability mode,
    /// until durable) unless rejected outright.
    pub fn write(&self, bytes: &[u8]) -> Result<(), LogError> {
        if !self.shared.has_sink.load(Ordering::Acquire) {
            warn!("femto_audit_log: write rejected, no file configured");
            return Err(LogError::NoFile);
        }

        let capacity = self.log_buffer_capacity();
        check_record_size(bytes.len(), capacity)?;

        let mut guard = self.shared.state.lock();
        loop {
            if guard.double_buffer.incoming().fits(bytes.len()) {
                break;
            }
            if guard.stop {
                return Err(LogError::ShutdownDuringWrite);
            }
            info!("femto_audit_log: incoming buffer full, signalling worker and waiting");
            guard.buffer_ready = false;
            self.shared.writer_signal.notify_one();
            let _ = self
                .shared
                .writer_signal
                .wait_while(&mut guard, |s: &mut SharedState| {
                    !s.buffer_ready && !s.stop
                });
        }

        guard.double_buffer.incoming().append(bytes);
        info!(
            "femto_audit_log: admitted {} byte record into incoming buffer",
            bytes.len()
        );

        if !guard.full_durability {
            return Ok(());
        }

        let ticket = guard.double_buffer.register_waiter();
        loop {
            if let Some(outcome) = guard.double_buffer.take_waiter_outcome(ticket) {
                return outcome;
            }
            if guard.stop {
                return Err(LogError::ShutdownDuringWrite);
            }
            self.shared.fsync_signal.wait(&mut guard);
        }
    }
}

impl Drop for LogManager {
    fn drop(&mut self) {
        self.stop_fsync_thread();
    }
}
