//! Fuzz target for the hash-clone pool
//!
//! Applies arbitrary interleavings of reserve/get/release/destroy and
//! checks the structural invariants: occupancy never exceeds capacity and
//! lookups are bounded to the reserving partition.

#![no_main]

use arbitrary::Arbitrary;
use cryptcell_core::HashClonePool;
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
enum PoolOp {
    Reserve { owner: i8, source: u8 },
    Get { index: u8, owner: i8 },
    Release { index: u8 },
    Destroy { source: u8 },
}

fuzz_target!(|input: (u8, Vec<PoolOp>)| {
    let (capacity, ops) = input;
    let capacity = usize::from(capacity % 8) + 1;
    let mut pool = HashClonePool::new(capacity);

    for op in ops {
        match op {
            PoolOp::Reserve { owner, source } => {
                if let Ok(index) = pool.reserve(i32::from(owner), u32::from(source)) {
                    assert!(index < capacity);
                    assert_eq!(pool.get(index, i32::from(owner)), Ok(u32::from(source)));
                }
            },
            PoolOp::Get { index, owner } => {
                let _ = pool.get(usize::from(index), i32::from(owner));
            },
            PoolOp::Release { index } => pool.release(usize::from(index)),
            PoolOp::Destroy { source } => pool.destroy(u32::from(source)),
        }
        assert!(pool.occupied() <= capacity);
    }
});
