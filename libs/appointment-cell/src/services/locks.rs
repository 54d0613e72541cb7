use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::debug;

use crate::models::SlotKey;

/// One async mutex per (doctor, date). Holders of different keys never
/// contend with each other.
pub struct SlotLockRegistry {
    locks: Mutex<HashMap<SlotKey, Arc<Mutex<()>>>>,
    prune_threshold: usize,
}

impl SlotLockRegistry {
    pub fn new(prune_threshold: usize) -> Self {
        Self {
            locks: Mutex::new(HashMap::new()),
            prune_threshold: prune_threshold.max(1),
        }
    }

    pub async fn acquire(&self, key: SlotKey) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            if locks.len() >= self.prune_threshold {
                Self::prune(&mut locks);
            }
            Arc::clone(locks.entry(key).or_insert_with(|| Arc::new(Mutex::new(()))))
        };

        lock.lock_owned().await
    }

    pub async fn tracked_keys(&self) -> usize {
        self.locks.lock().await.len()
    }

    // Entries only referenced by the map are neither held nor awaited.
    fn prune(locks: &mut HashMap<SlotKey, Arc<Mutex<()>>>) {
        let before = locks.len();
        locks.retain(|_, lock| Arc::strong_count(lock) > 1);
        debug!("Pruned {} idle slot locks", before - locks.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::time::Duration;
    use uuid::Uuid;

    fn key(day: u32) -> SlotKey {
        SlotKey::new(Uuid::nil(), NaiveDate::from_ymd_opt(2025, 6, day).unwrap())
    }

    #[tokio::test]
    async fn test_same_key_is_exclusive() {
        let registry = Arc::new(SlotLockRegistry::new(16));
        let guard = registry.acquire(key(23)).await;

        let contender = {
            let registry = Arc::clone(&registry);
            tokio::spawn(async move {
                let _guard = registry.acquire(key(23)).await;
            })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!contender.is_finished());

        drop(guard);
        contender.await.unwrap();
    }

    #[tokio::test]
    async fn test_different_keys_do_not_contend() {
        let registry = SlotLockRegistry::new(16);
        let _monday = registry.acquire(key(23)).await;
        let _next_monday = registry.acquire(key(30)).await;
        assert_eq!(registry.tracked_keys().await, 2);
    }

    #[tokio::test]
    async fn test_idle_locks_are_pruned() {
        let registry = SlotLockRegistry::new(2);
        drop(registry.acquire(key(1)).await);
        drop(registry.acquire(key(2)).await);
        let _held = registry.acquire(key(3)).await;

        assert_eq!(registry.tracked_keys().await, 1);
    }
}
