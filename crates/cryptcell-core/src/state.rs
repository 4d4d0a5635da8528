//! Service-wide configuration and shared mutable state.

use crate::access_control::AccessControlTable;
use crate::clone_pool::HashClonePool;

/// Tuning knobs fixed at service construction.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Maximum bytes pulled from the transport per chunked-read round.
    pub chunk_size: usize,
    /// Fixed capacity of the hash-clone pool.
    pub clone_capacity: usize,
    /// Upper bound on an entropy-injection seed, in bytes.
    pub max_entropy_seed: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self { chunk_size: 400, clone_capacity: 2, max_entropy_seed: 1024 }
    }
}

/// Mutable state shared by every operation family.
///
/// Touched only from the dispatch thread; no interior locking.
#[derive(Debug)]
pub struct ServiceState {
    /// Balanced init/free reference count across caller partitions.
    init_refs: u32,
    /// Handle-to-owner table consulted on every handle-consuming call.
    pub access: AccessControlTable,
    /// In-flight hash-clone reservations.
    pub clones: HashClonePool,
}

impl ServiceState {
    /// Fresh state with an empty access table and a clone pool of the
    /// configured capacity.
    pub fn new(config: &ServiceConfig) -> Self {
        Self {
            init_refs: 0,
            access: AccessControlTable::new(),
            clones: HashClonePool::new(config.clone_capacity),
        }
    }

    /// Record one successful library initialization.
    pub fn acquire(&mut self) {
        self.init_refs = self.init_refs.saturating_add(1);
    }

    /// Record one library teardown request.
    ///
    /// Returns true when the reference count has reached zero and global
    /// teardown (clearing the access table and clone pool, releasing the
    /// primitive layer) must run. Unbalanced frees do not underflow: a
    /// free at zero still reports ready-for-teardown, matching callers
    /// that tear down without ever initializing.
    pub fn release(&mut self) -> bool {
        self.init_refs = self.init_refs.saturating_sub(1);
        self.init_refs == 0
    }

    /// Current initialization reference count.
    pub fn init_refs(&self) -> u32 {
        self.init_refs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let config = ServiceConfig::default();
        assert_eq!(config.chunk_size, 400);
        assert_eq!(config.clone_capacity, 2);
        assert_eq!(config.max_entropy_seed, 1024);
    }

    #[test]
    fn release_tears_down_only_at_zero() {
        let mut state = ServiceState::new(&ServiceConfig::default());
        state.acquire();
        state.acquire();

        assert!(!state.release());
        assert!(state.release());
        assert_eq!(state.init_refs(), 0);
    }

    #[test]
    fn release_at_zero_does_not_underflow() {
        let mut state = ServiceState::new(&ServiceConfig::default());
        assert!(state.release());
        assert_eq!(state.init_refs(), 0);
        assert!(state.release());
    }
}
