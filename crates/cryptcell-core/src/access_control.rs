//! Key-handle access control.
//!
//! The access-control table is the sole trust boundary between partitions
//! sharing one crypto service instance. Every operation that consumes a
//! caller-supplied handle must pass [`AccessControlTable::is_permitted`]
//! before the handle reaches the primitive layer; a failed check
//! short-circuits the call with an invalid-handle outcome and performs no
//! further side effects.
//!
//! The table outlives any single connection: handles created by
//! key-management calls are used by data-operation calls on other
//! connections later.

use std::collections::HashMap;

use cryptcell_proto::PartitionId;

use crate::primitives::KeyHandle;

/// Persistent 64-bit key name combining a caller-chosen 32-bit application
/// id (high bits) with the owning partition id (low bits).
///
/// Two partitions supplying the same application-level id never collide,
/// because the partition id is folded into the composite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CompositeKeyId(u64);

// Structural precondition: the composite identifier is exactly 64 bits.
const _: () = assert!(size_of::<CompositeKeyId>() == 8);

impl CompositeKeyId {
    /// Assemble a composite identifier from an application id and the
    /// calling partition.
    pub fn assemble(app_id: u32, partition: PartitionId) -> Self {
        Self((u64::from(app_id) << 32) | u64::from(partition as u32))
    }

    /// The caller-chosen application id (high 32 bits).
    pub fn app_id(self) -> u32 {
        (self.0 >> 32) as u32
    }

    /// The owning partition id (low 32 bits).
    pub fn partition(self) -> PartitionId {
        self.0 as u32 as PartitionId
    }

    /// The raw 64-bit value.
    pub fn raw(self) -> u64 {
        self.0
    }
}

/// Table binding live key handles to their owning partitions.
///
/// At most one entry exists per handle; a handle absent from the table is
/// unowned and must be rejected by every handle-consuming operation.
#[derive(Debug, Default)]
pub struct AccessControlTable {
    entries: HashMap<KeyHandle, PartitionId>,
}

impl AccessControlTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record ownership of a freshly allocated handle.
    ///
    /// Handles are allocator-issued and never live twice, so an existing
    /// entry indicates a programmer error in the key-management family; the
    /// violation is logged and the owner overwritten.
    pub fn register(&mut self, handle: KeyHandle, owner: PartitionId) {
        if let Some(previous) = self.entries.insert(handle, owner) {
            tracing::error!(handle, previous, owner, "handle registered twice");
        }
    }

    /// Remove the entry for a handle; no-op if absent.
    pub fn unregister(&mut self, handle: KeyHandle) {
        self.entries.remove(&handle);
    }

    /// True iff an entry exists for `handle` and its owner is `partition`.
    pub fn is_permitted(&self, handle: KeyHandle, partition: PartitionId) -> bool {
        self.entries.get(&handle) == Some(&partition)
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of registered handles.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True iff no handle is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_and_permit_owner_only() {
        let mut table = AccessControlTable::new();
        table.register(5, 7);

        assert!(table.is_permitted(5, 7));
        assert!(!table.is_permitted(5, 9));
        assert!(!table.is_permitted(6, 7));
    }

    #[test]
    fn unregister_revokes_access() {
        let mut table = AccessControlTable::new();
        table.register(5, 7);
        table.unregister(5);

        assert!(!table.is_permitted(5, 7));
        assert!(table.is_empty());
    }

    #[test]
    fn unregister_absent_handle_is_noop() {
        let mut table = AccessControlTable::new();
        table.register(5, 7);
        table.unregister(99);

        assert_eq!(table.len(), 1);
        assert!(table.is_permitted(5, 7));
    }

    #[test]
    fn duplicate_register_overwrites_owner() {
        let mut table = AccessControlTable::new();
        table.register(5, 7);
        table.register(5, 9);

        assert!(!table.is_permitted(5, 7));
        assert!(table.is_permitted(5, 9));
    }

    #[test]
    fn clear_drops_all_entries() {
        let mut table = AccessControlTable::new();
        table.register(1, 7);
        table.register(2, 8);
        table.clear();

        assert!(table.is_empty());
        assert!(!table.is_permitted(1, 7));
    }

    #[test]
    fn composite_id_round_trip() {
        let id = CompositeKeyId::assemble(0xDEAD_BEEF, 42);
        assert_eq!(id.app_id(), 0xDEAD_BEEF);
        assert_eq!(id.partition(), 42);
    }

    #[test]
    fn composite_id_negative_partition() {
        let id = CompositeKeyId::assemble(1, -3);
        assert_eq!(id.app_id(), 1);
        assert_eq!(id.partition(), -3);
    }

    #[test]
    fn composite_id_disjoint_per_partition() {
        let a = CompositeKeyId::assemble(100, 1);
        let b = CompositeKeyId::assemble(100, 2);
        assert_ne!(a, b);
        assert_ne!(a.raw(), b.raw());
    }
}
