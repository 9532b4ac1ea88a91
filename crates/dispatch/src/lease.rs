//! In-process partition claims.
//!
//! A lease is acquired before the active-job check and held until the
//! partition's dispatch attempt finishes, so two dispatch invocations in
//! the same process cannot both pass the check-then-act window and submit
//! the same partition twice. Invocations in different processes still race;
//! they coordinate only through observed external job state.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use coinpulse_core::PartitionKey;

/// Registry of partitions currently being dispatched by this process.
#[derive(Clone, Default)]
pub struct LeaseRegistry {
    held: Arc<Mutex<HashSet<PartitionKey>>>,
}

impl LeaseRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim a partition. Returns `None` when another invocation already
    /// holds it; the caller treats that as an idempotent skip.
    pub fn try_acquire(&self, partition: PartitionKey) -> Option<LeaseGuard> {
        let mut held = self.held.lock().expect("lease registry lock poisoned");
        if held.insert(partition) {
            Some(LeaseGuard {
                partition,
                held: self.held.clone(),
            })
        } else {
            None
        }
    }
}

/// Releases the claim on drop, on every exit path.
pub struct LeaseGuard {
    partition: PartitionKey,
    held: Arc<Mutex<HashSet<PartitionKey>>>,
}

impl Drop for LeaseGuard {
    fn drop(&mut self) {
        if let Ok(mut held) = self.held.lock() {
            held.remove(&self.partition);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn partition() -> PartitionKey {
        PartitionKey::new(2025, 11, 25, 21).unwrap()
    }

    #[test]
    fn test_second_acquire_blocked_while_held() {
        let registry = LeaseRegistry::new();
        let guard = registry.try_acquire(partition());
        assert!(guard.is_some());
        assert!(registry.try_acquire(partition()).is_none());
    }

    #[test]
    fn test_release_on_drop() {
        let registry = LeaseRegistry::new();
        drop(registry.try_acquire(partition()));
        assert!(registry.try_acquire(partition()).is_some());
    }

    #[test]
    fn test_distinct_partitions_independent() {
        let registry = LeaseRegistry::new();
        let _a = registry.try_acquire(partition()).unwrap();
        let other = PartitionKey::new(2025, 11, 25, 22).unwrap();
        assert!(registry.try_acquire(other).is_some());
    }
}
