//! Request Coalescer Module
//!
//! Merges concurrent requests for the same key into one in-flight operation.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use futures::future::{BoxFuture, FutureExt, Shared};
use tracing::debug;

type SharedOp<T, E> = Shared<BoxFuture<'static, Result<T, E>>>;
type Table<T, E> = Mutex<HashMap<String, InFlight<T, E>>>;

struct InFlight<T, E> {
    id: u64,
    op: SharedOp<T, E>,
}

// == Request Coalescer ==
/// Table of in-flight operations keyed by cache key.
///
/// The first caller for a key runs the operation; callers arriving before it
/// settles await the same shared future and observe the same `Ok` or `Err`.
/// The entry is removed as soon as the operation settles, fails, panics or
/// is dropped, so the next caller after that starts a fresh attempt.
///
/// The table lock is only ever held for a single lookup/insert/remove and
/// never across an `.await`.
pub struct RequestCoalescer<T, E> {
    in_flight: Arc<Table<T, E>>,
    next_id: AtomicU64,
}

impl<T, E> RequestCoalescer<T, E>
where
    T: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self {
            in_flight: Arc::new(Mutex::new(HashMap::new())),
            next_id: AtomicU64::new(0),
        }
    }

    // == Dedupe ==
    /// Runs `op` for `key` unless an operation for `key` is already in flight,
    /// in which case its outcome is awaited instead and `op` is never called.
    pub async fn dedupe<F, Fut>(&self, key: &str, op: F) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        let shared = {
            let mut table = lock(&self.in_flight);
            match table.get(key) {
                Some(existing) => {
                    debug!(key, "Joining in-flight request");
                    existing.op.clone()
                }
                None => {
                    // `op` runs before the guard exists: `Release::drop` takes
                    // the table lock, which is held here.
                    let fut = op();
                    let id = self.next_id.fetch_add(1, Ordering::Relaxed);
                    let release = Release {
                        table: Arc::downgrade(&self.in_flight),
                        key: key.to_string(),
                        id,
                    };
                    let shared = async move {
                        let _release = release;
                        fut.await
                    }
                    .boxed()
                    .shared();

                    table.insert(
                        key.to_string(),
                        InFlight {
                            id,
                            op: shared.clone(),
                        },
                    );
                    shared
                }
            }
        };

        shared.await
    }

    /// Number of operations currently in flight.
    pub fn in_flight(&self) -> usize {
        lock(&self.in_flight).len()
    }

    pub fn is_in_flight(&self, key: &str) -> bool {
        lock(&self.in_flight).contains_key(key)
    }

    // == Forget ==
    /// Detaches the in-flight operation for `key`.
    ///
    /// Callers already waiting on it still get its outcome; the next caller
    /// starts a new operation. Returns whether an entry was detached.
    pub fn forget(&self, key: &str) -> bool {
        let removed = lock(&self.in_flight).remove(key);
        // Dropped outside the lock: the last handle to an operation runs its
        // release guard, which takes the lock again.
        removed.is_some()
    }

    /// Detaches every in-flight operation. Returns how many were detached.
    pub fn forget_all(&self) -> usize {
        let removed: Vec<InFlight<T, E>> = {
            let mut table = lock(&self.in_flight);
            table.drain().map(|(_, entry)| entry).collect()
        };
        removed.len()
    }
}

impl<T, E> Default for RequestCoalescer<T, E>
where
    T: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T, E> std::fmt::Debug for RequestCoalescer<T, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let in_flight = lock(&self.in_flight).len();
        f.debug_struct("RequestCoalescer")
            .field("in_flight", &in_flight)
            .finish()
    }
}

/// Removes its own table entry when the operation completes or is dropped.
struct Release<T, E> {
    table: Weak<Table<T, E>>,
    key: String,
    id: u64,
}

impl<T, E> Drop for Release<T, E> {
    fn drop(&mut self) {
        let Some(table) = self.table.upgrade() else {
            return;
        };
        let removed = {
            let mut table = lock(&table);
            match table.get(&self.key) {
                Some(entry) if entry.id == self.id => table.remove(&self.key),
                _ => None,
            }
        };
        drop(removed);
    }
}

// Every critical section is a single map operation, so a panic elsewhere
// cannot leave the table half-updated.
fn lock<T, E>(table: &Table<T, E>) -> MutexGuard<'_, HashMap<String, InFlight<T, E>>> {
    table.lock().unwrap_or_else(PoisonError::into_inner)
}
