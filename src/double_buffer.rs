//! Two [`Buffer`]s whose roles alternate on [`DoubleBuffer::swap`].
//!
//! Roles are represented as an index into a 2-element array rather than raw
//! pointers, per the design notes: the swap is then a single `xor`-style flip,
//! trivially correct and never a source of aliasing bugs.

use crate::buffer::Buffer;
use crate::error::LogError;

/// A durability ticket handed to a producer when it appends a record while
/// full-durability mode is active.
///
/// The ticket names the physical slot the record landed in. Because a swap
/// only relabels which slot is "incoming" versus "outgoing" — it never moves
/// bytes or waiter entries between slots — the ticket stays valid across the
/// swap that hands the producer's record to the flush worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaiterTicket {
    slot: usize,
    id: u64,
}

struct Waiter {
    id: u64,
    outcome: Option<Result<(), LogError>>,
}

/// Pair of [`Buffer`]s plus the incoming/outgoing role assignment and each
/// slot's list of durability waiters.
pub struct DoubleBuffer {
    slots: [Buffer; 2],
    waiters: [Vec<Waiter>; 2],
    incoming: usize,
    next_waiter_id: u64,
}

impl DoubleBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: [Buffer::new(capacity), Buffer::new(capacity)],
            waiters: [Vec::new(), Vec::new()],
            incoming: 0,
            next_waiter_id: 0,
        }
    }

    pub fn incoming(&mut self) -> &mut Buffer {
        &mut self.slots[self.incoming]
    }

    pub fn outgoing(&mut self) -> &mut Buffer {
        &mut self.slots[1 - self.incoming]
    }

    fn outgoing_index(&self) -> usize {
        1 - self.incoming
    }

    /// Role reassignment only — no byte movement. The previously-incoming
    /// slot (now outgoing) holds the data to flush; the previously-outgoing
    /// slot (now incoming, expected empty) accepts new records.
    pub fn swap(&mut self) {
        self.incoming = 1 - self.incoming;
    }

    /// Raise both slots' reserved capacity to at least `n`.
    pub fn reserve(&mut self, n: usize) {
        for slot in &mut self.slots {
            slot.reserve(n);
        }
    }

    /// Register a waiter against the current incoming slot. Call this
    /// immediately after appending the producer's record, before the next
    /// swap can hand the slot to the worker.
    pub fn register_waiter(&mut self) -> WaiterTicket {
        let id = self.next_waiter_id;
        self.next_waiter_id += 1;
        self.waiters[self.incoming].push(Waiter { id, outcome: None });
        WaiterTicket {
            slot: self.incoming,
            id,
        }
    }

    /// Remove and return the ticket's outcome, if the cycle that owns its
    /// slot has delivered one. Returns `None` while still pending — callers
    /// drive a condvar predicate loop around this.
    pub fn take_waiter_outcome(&mut self, ticket: WaiterTicket) -> Option<Result<(), LogError>> {
        let vec = &mut self.waiters[ticket.slot];
        let pos = vec.iter().position(|w| w.id == ticket.id)?;
        if vec[pos].outcome.is_some() {
            Some(vec.remove(pos).outcome.expect("checked Some above"))
        } else {
            None
        }
    }

    /// Deliver `outcome` to every waiter currently registered against the
    /// outgoing slot — called once per completed (successful or failed)
    /// flush attempt on that slot.
    pub fn deliver_outgoing_outcome(&mut self, outcome: Result<(), LogError>) {
        let idx = self.outgoing_index();
        for w in &mut self.waiters[idx] {
            w.outcome = Some(outcome.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn swap_alternates_incoming_without_copying_bytes() {
        let mut db = DoubleBuffer::new(64);
        db.incoming().append(b"first");
        db.swap();
        assert_eq!(db.outgoing().as_bytes(), b"first");
        assert!(db.incoming().is_empty());
    }

    #[test]
    fn waiter_ticket_survives_swap_and_receives_outcome() {
        let mut db = DoubleBuffer::new(64);
        db.incoming().append(b"rec");
        let ticket = db.register_waiter();
        assert_eq!(db.take_waiter_outcome(ticket), None);

        db.swap();
        db.deliver_outgoing_outcome(Ok(()));

        assert_eq!(db.take_waiter_outcome(ticket), Some(Ok(())));
        // Taken once; a second take sees nothing left to remove.
        assert_eq!(db.take_waiter_outcome(ticket), None);
    }

    #[test]
    fn distinct_waiters_on_same_cycle_each_get_their_own_outcome() {
        let mut db = DoubleBuffer::new(64);
        db.incoming().append(b"a");
        let t1 = db.register_waiter();
        db.incoming().append(b"b");
        let t2 = db.register_waiter();

        db.swap();
        db.deliver_outgoing_outcome(Err(LogError::NoFile));

        assert_eq!(db.take_waiter_outcome(t1), Some(Err(LogError::NoFile)));
        assert_eq!(db.take_waiter_outcome(t2), Some(Err(LogError::NoFile)));
    }

    #[test]
    fn reserve_raises_both_slots() {
        let mut db = DoubleBuffer::new(4);
        db.reserve(128);
        assert_eq!(db.incoming().capacity(), 128);
        assert_eq!(db.outgoing().capacity(), 128);
    }

    proptest! {
        // Waiters from one swap cycle never observe an outcome meant for
        // another: each cycle's `deliver_outgoing_outcome` targets only the
        // waiters still registered against the slot that was just flushed.
        #[test]
        fn waiters_never_cross_cycles(cycle_succeeds in proptest::collection::vec(any::<bool>(), 1..8)) {
            let mut db = DoubleBuffer::new(64);
            for succeeds in cycle_succeeds {
                db.incoming().append(b"x");
                let ticket = db.register_waiter();
                db.swap();
                let outcome = if succeeds {
                    Ok(())
                } else {
                    Err(LogError::NoFile)
                };
                db.deliver_outgoing_outcome(outcome.clone());
                db.outgoing().clear();
                prop_assert_eq!(db.take_waiter_outcome(ticket), Some(outcome));
                prop_assert_eq!(db.take_waiter_outcome(ticket), None);
            }
        }
    }
}
