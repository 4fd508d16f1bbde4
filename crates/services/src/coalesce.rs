use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;

use futures_util::future::{FutureExt, Shared};
use parking_lot::Mutex;

use crate::http::BoxFuture;

type SharedFetch<V, E> = Shared<BoxFuture<'static, Result<V, E>>>;

enum Slot<V, E> {
    Ready(V),
    Pending { id: u64, fetch: SharedFetch<V, E> },
}

struct Slots<K, V, E> {
    entries: HashMap<K, Slot<V, E>>,
    next_id: u64,
}

/// Memoizing cache with at most one in-flight fetch per key.
///
/// Concurrent callers for the same key await a single shared fetch.
/// Successes are kept; failures reach every waiter and are then forgotten,
/// so the next call starts a fresh fetch (there is no automatic retry).
///
/// The lock is never held across an await point.
pub struct CoalescingCache<K, V, E> {
    slots: Mutex<Slots<K, V, E>>,
}

impl<K, V, E> Default for CoalescingCache<K, V, E> {
    fn default() -> Self {
        Self {
            slots: Mutex::new(Slots {
                entries: HashMap::new(),
                next_id: 0,
            }),
        }
    }
}

impl<K, V, E> std::fmt::Debug for CoalescingCache<K, V, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let slots = self.slots.lock();
        let pending = slots
            .entries
            .values()
            .filter(|s| matches!(s, Slot::Pending { .. }))
            .count();
        f.debug_struct("CoalescingCache")
            .field("entries", &slots.entries.len())
            .field("pending", &pending)
            .finish()
    }
}

impl<K, V, E> CoalescingCache<K, V, E>
where
    K: Eq + Hash + Clone,
    V: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached value for `key`, join the fetch already running for
    /// it, or start one with `fetch`.
    ///
    /// `fetch` is only invoked to build the future; it runs under the cache
    /// lock and must not block.
    pub async fn get_or_fetch<F, Fut>(&self, key: K, fetch: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>> + Send + 'static,
    {
        let (id, shared) = {
            let mut slots = self.slots.lock();
            match slots.entries.get(&key) {
                Some(Slot::Ready(v)) => return Ok(v.clone()),
                Some(Slot::Pending { id, fetch }) => (*id, fetch.clone()),
                None => {
                    let id = slots.next_id;
                    slots.next_id += 1;
                    let boxed: BoxFuture<'static, Result<V, E>> = Box::pin(fetch());
                    let shared = boxed.shared();
                    slots.entries.insert(
                        key.clone(),
                        Slot::Pending {
                            id,
                            fetch: shared.clone(),
                        },
                    );
                    (id, shared)
                }
            }
        };

        let result = shared.await;
        self.settle(&key, id, &result);
        result
    }

    fn settle(&self, key: &K, id: u64, result: &Result<V, E>) {
        let mut slots = self.slots.lock();
        let same_fetch = matches!(
            slots.entries.get(key),
            Some(Slot::Pending { id: current, .. }) if *current == id
        );
        if !same_fetch {
            return;
        }
        match result {
            Ok(v) => {
                slots.entries.insert(key.clone(), Slot::Ready(v.clone()));
            }
            Err(_) => {
                slots.entries.remove(key);
            }
        }
    }

    /// Cached value, if the fetch for `key` already succeeded.
    pub fn peek(&self, key: &K) -> Option<V> {
        match self.slots.lock().entries.get(key) {
            Some(Slot::Ready(v)) => Some(v.clone()),
            _ => None,
        }
    }

    pub fn is_pending(&self, key: &K) -> bool {
        matches!(
            self.slots.lock().entries.get(key),
            Some(Slot::Pending { .. })
        )
    }

    /// Number of memoized values (pending fetches excluded).
    pub fn len(&self) -> usize {
        self.slots
            .lock()
            .entries
            .values()
            .filter(|s| matches!(s, Slot::Ready(_)))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Forget `key`. Callers already waiting on its fetch still get the result.
    pub fn invalidate(&self, key: &K) -> bool {
        self.slots.lock().entries.remove(key).is_some()
    }

    pub fn clear(&self) {
        self.slots.lock().entries.clear();
    }
}
