//! KeyedLocks - キーごとの非同期排他制御
//!
//! One tokio mutex per key, created on first use and dropped again when the
//! last holder (or waiter) lets go. Holding a guard across `.await` is fine.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Mutex};

use tokio::sync::OwnedMutexGuard;

struct Slot {
    mutex: Arc<tokio::sync::Mutex<()>>,
    /// Holders plus waiters. The slot is removed when this drops to zero.
    users: usize,
}

pub struct KeyedLocks<K> {
    slots: Mutex<HashMap<K, Slot>>,
}

impl<K: Eq + Hash + Clone> KeyedLocks<K> {
    pub fn new() -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// Wait for exclusive access to `key`.
    ///
    /// Dropping the returned future while it waits gives up its place and
    /// releases the slot.
    pub async fn lock(&self, key: K) -> KeyedGuard<'_, K> {
        let (mutex, registration) = self.register(key);
        let guard = mutex.lock_owned().await;
        KeyedGuard {
            _guard: guard,
            _registration: registration,
        }
    }

    /// Lock several keys. Keys are taken in the order given; callers must
    /// use one fixed order for overlapping key sets.
    pub async fn lock_all(&self, keys: impl IntoIterator<Item = K>) -> Vec<KeyedGuard<'_, K>> {
        let mut guards = Vec::new();
        for key in keys {
            guards.push(self.lock(key).await);
        }
        guards
    }

    /// Number of keys currently held or waited on.
    pub fn active_keys(&self) -> usize {
        self.slots.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    fn register(&self, key: K) -> (Arc<tokio::sync::Mutex<()>>, Registration<'_, K>) {
        let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        let slot = slots.entry(key.clone()).or_insert_with(|| Slot {
            mutex: Arc::default(),
            users: 0,
        });
        slot.users += 1;
        (Arc::clone(&slot.mutex), Registration { locks: self, key })
    }
}

impl<K: Eq + Hash + Clone> Default for KeyedLocks<K> {
    fn default() -> Self {
        Self::new()
    }
}

/// One counted user of a slot, from the moment it starts waiting.
struct Registration<'a, K: Eq + Hash + Clone> {
    locks: &'a KeyedLocks<K>,
    key: K,
}

impl<K: Eq + Hash + Clone> Drop for Registration<'_, K> {
    fn drop(&mut self) {
        let mut slots = self.locks.slots.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(slot) = slots.get_mut(&self.key) {
            slot.users -= 1;
            if slot.users == 0 {
                slots.remove(&self.key);
            }
        }
    }
}

/// Exclusive access to one key until dropped.
pub struct KeyedGuard<'a, K: Eq + Hash + Clone> {
    // fields drop in order: unlock first, then unregister
    _guard: OwnedMutexGuard<()>,
    _registration: Registration<'a, K>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn same_key_is_exclusive() {
        let locks = Arc::new(KeyedLocks::new());
        let inside = Arc::new(AtomicUsize::new(0));
        let max_inside = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let locks = Arc::clone(&locks);
            let inside = Arc::clone(&inside);
            let max_inside = Arc::clone(&max_inside);
            handles.push(tokio::spawn(async move {
                let _guard = locks.lock("spark").await;
                let now = inside.fetch_add(1, Ordering::SeqCst) + 1;
                max_inside.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(5)).await;
                inside.fetch_sub(1, Ordering::SeqCst);
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(max_inside.load(Ordering::SeqCst), 1);
        assert_eq!(locks.active_keys(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn different_keys_do_not_block_each_other() {
        let locks = Arc::new(KeyedLocks::new());
        let _held = locks.lock("spark").await;

        let other = tokio::time::timeout(Duration::from_millis(200), locks.lock("hadoop")).await;
        assert!(other.is_ok());
    }

    #[tokio::test]
    async fn timed_out_waiter_releases_its_slot() {
        let locks = KeyedLocks::new();
        let held = locks.lock("spark").await;

        let waited = tokio::time::timeout(Duration::from_millis(20), locks.lock("spark")).await;
        assert!(waited.is_err());
        assert_eq!(locks.active_keys(), 1);

        drop(held);
        assert_eq!(locks.active_keys(), 0);
    }

    #[tokio::test]
    async fn aborted_waiter_releases_its_slot() {
        let locks = Arc::new(KeyedLocks::new());
        let held = locks.lock("spark").await;

        let waiter = {
            let locks = Arc::clone(&locks);
            tokio::spawn(async move {
                let _guard = locks.lock("spark").await;
            })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        waiter.abort();
        assert!(waiter.await.unwrap_err().is_cancelled());

        drop(held);
        assert_eq!(locks.active_keys(), 0);

        // the key is usable again afterwards
        let _again = locks.lock("spark").await;
        assert_eq!(locks.active_keys(), 1);
    }

    #[tokio::test]
    async fn slot_is_reclaimed_after_release() {
        let locks = KeyedLocks::new();
        {
            let _guard = locks.lock(1).await;
            assert_eq!(locks.active_keys(), 1);
        }
        assert_eq!(locks.active_keys(), 0);
    }
}
