//! Mutex-guarded state shared between `LogManager`'s public API and the
//! flush worker thread.

use std::time::{Duration, Instant};

use crate::double_buffer::DoubleBuffer;

/// Everything protected by the single buffer mutex: the double buffer, the
/// producer/worker handshake flag, the durability mode, and the group-fsync
/// deadline.
///
/// The sink itself is deliberately *not* here — see
/// [`super::Shared`] — so a producer's cheap presence check never contends
/// with the worker holding the sink lock for the duration of an I/O call.
pub(crate) struct SharedState {
    pub(crate) double_buffer: DoubleBuffer,
    pub(crate) buffer_ready: bool,
    pub(crate) stop: bool,
    pub(crate) full_durability: bool,
    pub(crate) next_group_fsync: Instant,
    pub(crate) group_fsync_period: Duration,
}

impl SharedState {
    pub(crate) fn new(capacity: usize, group_fsync_period: Duration) -> Self {
        Self {
            double_buffer: DoubleBuffer::new(capacity),
            buffer_ready: false,
            stop: false,
            full_durability: false,
            next_group_fsync: Instant::now(),
            group_fsync_period,
        }
    }
}
