//! Bounded hash-clone tracking pool.
//!
//! The streaming-hash clone primitive lets a caller snapshot an in-progress
//! hash without unbounded secure-side allocation: the pool trades full
//! generality for a small fixed capacity plus idempotent-retry tolerance.
//! A `clone-begin` reserves a slot naming the source operation's
//! connection; the matching `clone-end` looks the slot up by index and
//! releases it. Capacity exhaustion is expected backpressure (`BadState`),
//! not a fault.

use cryptcell_proto::{ConnectionId, ErrorCode, PartitionId};

/// One occupied pool entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CloneSlot {
    /// Partition that reserved the slot; only it may look the slot up.
    owner: PartitionId,
    /// Connection whose hash operation is the clone source.
    source: ConnectionId,
    /// Reservation count for duplicate `clone-begin` retries.
    ref_count: u8,
}

/// Fixed-capacity pool of in-flight hash-clone reservations.
#[derive(Debug)]
pub struct HashClonePool {
    slots: Box<[Option<CloneSlot>]>,
}

impl HashClonePool {
    /// Create a pool with the given fixed capacity.
    pub fn new(capacity: usize) -> Self {
        Self { slots: vec![None; capacity].into_boxed_slice() }
    }

    /// Reserve a slot for `(owner, source)`.
    ///
    /// If a reservation for the same pair already exists its reference
    /// count is incremented and the existing index returned: a caller
    /// retrying `clone-begin` without a matching `clone-end` must not burn
    /// a second slot. Otherwise the first free slot is taken. A full pool
    /// yields [`ErrorCode::BadState`] without mutating any slot.
    pub fn reserve(
        &mut self,
        owner: PartitionId,
        source: ConnectionId,
    ) -> Result<usize, ErrorCode> {
        for (index, entry) in self.slots.iter_mut().enumerate() {
            if let Some(slot) = entry {
                if slot.owner == owner && slot.source == source {
                    slot.ref_count = slot.ref_count.saturating_add(1);
                    return Ok(index);
                }
            }
        }

        for (index, entry) in self.slots.iter_mut().enumerate() {
            if entry.is_none() {
                *entry = Some(CloneSlot { owner, source, ref_count: 1 });
                return Ok(index);
            }
        }

        Err(ErrorCode::BadState)
    }

    /// Look up a reserved slot and return its source connection.
    ///
    /// Fails with [`ErrorCode::BadState`] if the index is out of range, the
    /// slot is unoccupied, or the slot belongs to a different partition —
    /// use of an index is bounded strictly to the partition that created
    /// it.
    pub fn get(&self, index: usize, owner: PartitionId) -> Result<ConnectionId, ErrorCode> {
        match self.slots.get(index) {
            Some(Some(slot)) if slot.owner == owner => Ok(slot.source),
            _ => Err(ErrorCode::BadState),
        }
    }

    /// Release one reservation on a slot; the slot is freed when the count
    /// reaches zero. Releasing an unoccupied slot is a no-op.
    pub fn release(&mut self, index: usize) {
        if let Some(entry) = self.slots.get_mut(index) {
            if let Some(slot) = entry {
                slot.ref_count -= 1;
                if slot.ref_count == 0 {
                    *entry = None;
                }
            }
        }
    }

    /// Force-clear any slot referencing `source`, regardless of reference
    /// count.
    ///
    /// Invoked whenever the owning streaming operation is destroyed through
    /// any path (finish, verify, abort, or connection teardown) so a
    /// terminated clone sequence cannot leak a slot.
    pub fn destroy(&mut self, source: ConnectionId) {
        for entry in &mut self.slots {
            if entry.map(|slot| slot.source) == Some(source) {
                *entry = None;
                break;
            }
        }
    }

    /// Free every slot.
    pub fn clear(&mut self) {
        self.slots.fill(None);
    }

    /// Number of occupied slots.
    pub fn occupied(&self) -> usize {
        self.slots.iter().filter(|entry| entry.is_some()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reserve_takes_first_free_slot() {
        let mut pool = HashClonePool::new(2);
        assert_eq!(pool.reserve(7, 100), Ok(0));
        assert_eq!(pool.reserve(7, 200), Ok(1));
        assert_eq!(pool.occupied(), 2);
    }

    #[test]
    fn duplicate_reserve_is_idempotent() {
        let mut pool = HashClonePool::new(2);

        let first = pool.reserve(7, 100).unwrap();
        let second = pool.reserve(7, 100).unwrap();
        assert_eq!(first, second);
        assert_eq!(pool.occupied(), 1);

        // Two reservations need two releases.
        pool.release(first);
        assert_eq!(pool.get(first, 7), Ok(100));
        pool.release(first);
        assert_eq!(pool.get(first, 7), Err(ErrorCode::BadState));
    }

    #[test]
    fn release_of_free_slot_does_not_underflow() {
        let mut pool = HashClonePool::new(2);
        let index = pool.reserve(7, 100).unwrap();
        pool.release(index);
        pool.release(index);
        pool.release(index);

        // Pool state stays consistent: the slot is reusable.
        assert_eq!(pool.reserve(9, 300), Ok(index));
    }

    #[test]
    fn full_pool_rejects_without_mutation() {
        let mut pool = HashClonePool::new(2);
        pool.reserve(7, 100).unwrap();
        pool.reserve(8, 200).unwrap();

        assert_eq!(pool.reserve(9, 300), Err(ErrorCode::BadState));
        assert_eq!(pool.get(0, 7), Ok(100));
        assert_eq!(pool.get(1, 8), Ok(200));
    }

    #[test]
    fn get_validates_index_owner_and_occupancy() {
        let mut pool = HashClonePool::new(2);
        let index = pool.reserve(7, 100).unwrap();

        assert_eq!(pool.get(index, 7), Ok(100));
        assert_eq!(pool.get(index, 9), Err(ErrorCode::BadState));
        assert_eq!(pool.get(5, 7), Err(ErrorCode::BadState));
        assert_eq!(pool.get(1, 7), Err(ErrorCode::BadState));
    }

    #[test]
    fn destroy_clears_regardless_of_ref_count() {
        let mut pool = HashClonePool::new(2);
        let index = pool.reserve(7, 100).unwrap();
        pool.reserve(7, 100).unwrap();

        pool.destroy(100);
        assert_eq!(pool.get(index, 7), Err(ErrorCode::BadState));
        assert_eq!(pool.occupied(), 0);
    }

    #[test]
    fn destroy_of_unknown_source_is_noop() {
        let mut pool = HashClonePool::new(2);
        pool.reserve(7, 100).unwrap();
        pool.destroy(999);
        assert_eq!(pool.occupied(), 1);
    }

    #[test]
    fn clear_frees_everything() {
        let mut pool = HashClonePool::new(2);
        pool.reserve(7, 100).unwrap();
        pool.reserve(8, 200).unwrap();
        pool.clear();
        assert_eq!(pool.occupied(), 0);
    }
}
