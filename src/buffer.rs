//! The byte arena that backs one slot of a [`DoubleBuffer`](crate::double_buffer::DoubleBuffer).
//!
//! A `Buffer` packs record bytes back-to-back with no framing; callers are
//! responsible for checking [`Buffer::fits`] before every [`Buffer::append`].

/// A growable byte arena holding packed records and a record count.
///
/// Capacity is fixed at construction and only ever raised explicitly via
/// [`Buffer::reserve`]; `append` never grows the arena itself.
#[derive(Debug, Default)]
pub struct Buffer {
    data: Vec<u8>,
    capacity: usize,
    num_records: usize,
}

impl Buffer {
    /// Reserve `capacity` bytes up front. Record count starts at zero.
    pub fn new(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
            capacity,
            num_records: 0,
        }
    }

    /// True iff `size + n < capacity` — a strict inequality, not `<=`.
    ///
    /// The one-byte hysteresis at the boundary is preserved from the source
    /// implementation rather than tightened to `<=`.
    pub fn fits(&self, n: usize) -> bool {
        self.data.len() + n < self.capacity
    }

    /// Append `bytes` to the tail and count one more record.
    ///
    /// Callers must check [`Buffer::fits`] first; this never grows the
    /// reserved capacity.
    pub fn append(&mut self, bytes: &[u8]) {
        debug_assert!(
            self.fits(bytes.len()),
            "append called without a prior fits() check"
        );
        self.data.extend_from_slice(bytes);
        self.num_records += 1;
    }

    /// Reset size and record count to zero. Capacity is preserved.
    pub fn clear(&mut self) {
        self.data.clear();
        self.num_records = 0;
    }

    /// Raise the reserved capacity to at least `n`.
    pub fn reserve(&mut self, n: usize) {
        if n > self.capacity {
            self.data.reserve(n - self.data.len());
            self.capacity = n;
        }
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn num_records(&self) -> usize {
        self.num_records
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The populated prefix, for handing to a [`LogSink`](crate::sink::LogSink).
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }
}
