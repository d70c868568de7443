//! Configuration for [`LogManager`](super::LogManager), mirroring the shape
//! of the host framework's `HandlerConfig`.

use std::time::Duration;

/// Default buffer capacity in bytes, as observed in the source.
pub const DEFAULT_BUFFER_CAPACITY: usize = 10_000;

/// Default group-fsync period, as observed in the source.
pub const DEFAULT_GROUP_FSYNC_PERIOD: Duration = Duration::from_millis(10);

/// How long the worker sleeps between idle checks in best-effort mode.
pub const BEST_EFFORT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Construction-time configuration for a [`LogManager`](super::LogManager).
#[derive(Clone, Copy, Debug)]
pub struct ManagerConfig {
    /// Reserved byte capacity for each of the two buffer slots.
    pub capacity: usize,
    /// How often the worker group-fsyncs while full-durability mode is active.
    pub group_fsync_period: Duration,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_BUFFER_CAPACITY,
            group_fsync_period: DEFAULT_GROUP_FSYNC_PERIOD,
        }
    }
}

impl ManagerConfig {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            ..Self::default()
        }
    }
}
