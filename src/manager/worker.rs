//! The dedicated flush thread: wait, swap, write, sync, notify.
//!
//! Mirrors the host framework's file-handler worker loop (`spawn_worker` in
//! the teacher's `handlers/file/worker.rs`) in shape — a single thread owning
//! I/O, reporting completion back through a shared handshake — but replaces
//! the bounded-channel handoff with the double-buffer/condvar protocol this
//! crate's spec calls for.

use std::sync::Arc;
use std::time::Instant;

use log::{debug, error, info, warn};

use crate::error::{IoStageError, LogError};
use crate::sink::LogSink;

use super::config::BEST_EFFORT_POLL_INTERVAL;
use super::Shared;

/// Write `bytes` through `sink`: write, flush, sync, in that order. The first
/// stage to fail determines the reported [`IoStageError`] variant.
fn write_to_disk(sink: &mut dyn LogSink, bytes: &[u8]) -> Result<(), IoStageError> {
    sink.write_all(bytes)
        .map_err(|e| IoStageError::Write(e.to_string()))?;
    sink.flush().map_err(|e| IoStageError::Flush(e.to_string()))?;
    sink.sync_all().map_err(|e| IoStageError::Sync(e.to_string()))?;
    Ok(())
}

/// Run the flush loop until `stop` is observed. Intended to be the body of
/// the thread spawned by `LogManager::start_fsync_thread`.
pub(crate) fn run(shared: Arc<Shared>) {
    info!("femto_audit_log: flush worker starting");
    loop {
        let mut guard = shared.state.lock();

        if guard.stop {
            guard.stop = false;
            info!("femto_audit_log: flush worker stopping");
            return;
        }

        // No predicate: a spurious or timed-out wake is simply a prompt to
        // inspect buffer state, same as the source.
        if guard.full_durability {
            let deadline = guard.next_group_fsync;
            let _ = shared.writer_signal.wait_until(&mut guard, deadline);
        } else {
            let _ = shared
                .writer_signal
                .wait_for(&mut guard, BEST_EFFORT_POLL_INTERVAL);
        }

        debug!("femto_audit_log: worker woke");

        // Shutdown is only acted on at the top of the loop, once any swap
        // and flush this iteration's wake-up triggered has completed —
        // otherwise a `stop` that races a pending best-effort write would
        // drop it instead of draining it (scenario S5).
        if guard.double_buffer.outgoing().is_empty() && !guard.double_buffer.incoming().is_empty()
        {
            guard.double_buffer.swap();
            guard.buffer_ready = true;
            info!(
                "femto_audit_log: worker swapped buffers, {} records ready to flush",
                guard.double_buffer.outgoing().num_records()
            );
            shared.writer_signal.notify_all();
        }

        if guard.double_buffer.outgoing().is_empty() {
            continue;
        }

        // Outgoing holds data, either freshly swapped in or left over from a
        // failed attempt on a previous iteration. Copy it out so the mutex
        // can be released for the duration of I/O; the source instead passes
        // a raw pointer into the still-unlocked buffer, which Rust's
        // aliasing rules don't permit without `unsafe`.
        let bytes = guard.double_buffer.outgoing().as_bytes().to_vec();
        let full_durability = guard.full_durability;
        drop(guard);

        let outcome = {
            let mut sink_guard = shared.sink.lock();
            match sink_guard.as_mut() {
                Some(sink) => write_to_disk(sink.as_mut(), &bytes),
                None => {
                    // Sink was cleared between the presence check in `write`
                    // and this flush; nothing to do but retry next cycle.
                    warn!("femto_audit_log: worker has no sink, retrying next cycle");
                    continue;
                }
            }
        };

        let mut guard = shared.state.lock();
        match outcome {
            Ok(()) => {
                if full_durability {
                    guard.next_group_fsync = Instant::now() + guard.group_fsync_period;
                }
                let records = guard.double_buffer.outgoing().num_records();
                info!("femto_audit_log: flush succeeded, wrote {records} records");
                guard.double_buffer.deliver_outgoing_outcome(Ok(()));
                shared.fsync_signal.notify_all();
                guard.double_buffer.outgoing().clear();
            }
            Err(stage_err) => {
                error!("femto_audit_log: flush failed, will retry next cycle: {stage_err}");
                guard
                    .double_buffer
                    .deliver_outgoing_outcome(Err(LogError::FsyncFailed(stage_err)));
                shared.fsync_signal.notify_all();
                // Outgoing buffer is left intact; the next iteration retries
                // it without requiring a new swap.
            }
        }
    }
}
