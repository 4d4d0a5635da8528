//! Property-based tests for the access table, composite ids and clone pool.

use std::collections::HashMap;

use cryptcell_core::{AccessControlTable, CompositeKeyId, HashClonePool};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum TableOp {
    Register(u32, i32),
    Unregister(u32),
}

fn table_ops() -> impl Strategy<Value = Vec<TableOp>> {
    prop::collection::vec(
        prop_oneof![
            (0u32..16, -4i32..4).prop_map(|(h, p)| TableOp::Register(h, p)),
            (0u32..16).prop_map(TableOp::Unregister),
        ],
        1..64,
    )
}

/// Property: after any sequence of register/unregister, a handle is
/// permitted exactly for its most recent owner and nobody else.
#[test]
fn prop_table_tracks_single_owner() {
    proptest!(|(ops in table_ops())| {
        let mut table = AccessControlTable::new();
        let mut model: HashMap<u32, i32> = HashMap::new();

        for op in ops {
            match op {
                TableOp::Register(handle, owner) => {
                    table.register(handle, owner);
                    model.insert(handle, owner);
                },
                TableOp::Unregister(handle) => {
                    table.unregister(handle);
                    model.remove(&handle);
                },
            }
        }

        prop_assert_eq!(table.len(), model.len());
        for handle in 0u32..16 {
            for partition in -4i32..4 {
                prop_assert_eq!(
                    table.is_permitted(handle, partition),
                    model.get(&handle) == Some(&partition),
                );
            }
        }
    });
}

/// Property: composite ids round-trip both halves and never collide
/// across partitions.
#[test]
fn prop_composite_id_round_trip() {
    proptest!(|(app_id in any::<u32>(), partition in any::<i32>(), other in any::<i32>())| {
        let id = CompositeKeyId::assemble(app_id, partition);
        prop_assert_eq!(id.app_id(), app_id);
        prop_assert_eq!(id.partition(), partition);

        if other != partition {
            prop_assert_ne!(id, CompositeKeyId::assemble(app_id, other));
        }
    });
}

/// Property: the clone pool never holds more occupied slots than its
/// capacity, no matter the reservation/release interleaving.
#[test]
fn prop_clone_pool_stays_bounded() {
    proptest!(|(
        capacity in 1usize..4,
        ops in prop::collection::vec((any::<bool>(), -2i32..2, 0u32..6), 1..64),
    )| {
        let mut pool = HashClonePool::new(capacity);
        for (reserve, partition, source) in ops {
            if reserve {
                let _ = pool.reserve(partition, source);
            } else {
                pool.destroy(source);
            }
            prop_assert!(pool.occupied() <= capacity);
        }
    });
}

/// Property: a reservation is visible only to the partition that made it.
#[test]
fn prop_reservation_is_partition_scoped() {
    proptest!(|(owner in -4i32..4, intruder in -4i32..4, source in any::<u32>())| {
        let mut pool = HashClonePool::new(2);
        let index = pool.reserve(owner, source).unwrap();

        prop_assert_eq!(pool.get(index, owner), Ok(source));
        if intruder != owner {
            prop_assert!(pool.get(index, intruder).is_err());
        }
    });
}
