//! Per-key debounce and single-flight control for search requests.
//!
//! Each key owns at most one pending timer and one in-flight request. Starting
//! a request under a key cancels whatever was pending or running under it and
//! bumps the key's generation; a [`Ticket`] remembers the generation it was
//! issued for so late results can be recognised and dropped.

use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;

/// How a coordinated task ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    Completed(T),
    /// A newer request or an explicit cancel took over the key.
    Superseded,
}

impl<T> Outcome<T> {
    #[must_use]
    pub fn is_superseded(&self) -> bool {
        matches!(self, Outcome::Superseded)
    }
}

struct PendingTimer {
    id: u64,
    token: CancellationToken,
}

#[derive(Default)]
struct Slot {
    generation: u64,
    timer: Option<PendingTimer>,
    in_flight: Option<CancellationToken>,
}

impl Slot {
    fn cancel_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.token.cancel();
        }
    }

    fn cancel_in_flight(&mut self) {
        if let Some(token) = self.in_flight.take() {
            token.cancel();
        }
    }
}

struct KeyTable<K> {
    slots: HashMap<K, Slot>,
    next_timer_id: u64,
}

/// Debounce timers and in-flight requests, keyed by `K`.
///
/// Cloning yields another handle onto the same key table.
pub struct QueryCoordinator<K> {
    table: Arc<Mutex<KeyTable<K>>>,
}

impl<K> Clone for QueryCoordinator<K> {
    fn clone(&self) -> Self {
        Self {
            table: Arc::clone(&self.table),
        }
    }
}

impl<K> Default for QueryCoordinator<K>
where
    K: Eq + Hash + Clone + std::fmt::Debug + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K> std::fmt::Debug for QueryCoordinator<K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let keys = self.table.lock().slots.len();
        f.debug_struct("QueryCoordinator")
            .field("keys", &keys)
            .finish()
    }
}

impl<K> QueryCoordinator<K>
where
    K: Eq + Hash + Clone + std::fmt::Debug + Send + Sync + 'static,
{
    #[must_use]
    pub fn new() -> Self {
        Self {
            table: Arc::new(Mutex::new(KeyTable {
                slots: HashMap::new(),
                next_timer_id: 0,
            })),
        }
    }

    /// Runs `task` under `key` after `delay`, replacing any timer already
    /// pending under that key.
    ///
    /// When the timer fires the task runs exactly as through
    /// [`QueryCoordinator::run_now`]. Must be called from within a tokio
    /// runtime.
    pub fn schedule<F, Fut>(&self, key: K, delay: Duration, task: F)
    where
        F: FnOnce(Ticket<K>) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let token = CancellationToken::new();
        let id = {
            let mut table = self.table.lock();
            table.next_timer_id += 1;
            let id = table.next_timer_id;
            let slot = table.slots.entry(key.clone()).or_default();
            slot.cancel_timer();
            slot.timer = Some(PendingTimer {
                id,
                token: token.clone(),
            });
            id
        };

        let coordinator = self.clone();
        tokio::spawn(async move {
            tokio::select! {
                biased;
                () = token.cancelled() => return,
                () = tokio::time::sleep(delay) => {}
            }
            if !coordinator.take_timer(&key, id) {
                return;
            }
            let _ = coordinator.run_now(key, task).await;
        });
    }

    /// Runs `task` under `key` immediately.
    ///
    /// Cancels the pending timer and the in-flight request under `key`, then
    /// races `task` against its own cancellation. A cancelled task future is
    /// dropped at its current await point.
    pub async fn run_now<F, Fut, T>(&self, key: K, task: F) -> Outcome<T>
    where
        F: FnOnce(Ticket<K>) -> Fut,
        Fut: Future<Output = T>,
    {
        let ticket = self.begin(&key);
        let token = ticket.token.clone();
        let generation = ticket.generation;

        let outcome = tokio::select! {
            biased;
            () = token.cancelled() => Outcome::Superseded,
            value = task(ticket) => Outcome::Completed(value),
        };

        if outcome.is_superseded() {
            tracing::debug!(?key, generation, "request superseded");
        }
        self.finish(&key, generation);
        outcome
    }

    /// Cancels the timer and the request under `key`. Results still on their
    /// way for that key are dropped.
    pub fn cancel(&self, key: &K) {
        let mut table = self.table.lock();
        if let Some(slot) = table.slots.get_mut(key) {
            slot.cancel_timer();
            slot.cancel_in_flight();
            slot.generation += 1;
        }
    }

    /// Cancels every timer and request this coordinator owns.
    pub fn cancel_all(&self) {
        let mut table = self.table.lock();
        for slot in table.slots.values_mut() {
            slot.cancel_timer();
            slot.cancel_in_flight();
            slot.generation += 1;
        }
    }

    /// Whether a debounce timer is pending under `key`.
    #[must_use]
    pub fn is_scheduled(&self, key: &K) -> bool {
        self.table
            .lock()
            .slots
            .get(key)
            .is_some_and(|slot| slot.timer.is_some())
    }

    /// Whether a request is running under `key`.
    #[must_use]
    pub fn is_in_flight(&self, key: &K) -> bool {
        self.table
            .lock()
            .slots
            .get(key)
            .is_some_and(|slot| slot.in_flight.is_some())
    }

    fn begin(&self, key: &K) -> Ticket<K> {
        let token = CancellationToken::new();
        let mut table = self.table.lock();
        let slot = table.slots.entry(key.clone()).or_default();
        slot.cancel_timer();
        slot.cancel_in_flight();
        slot.generation += 1;
        slot.in_flight = Some(token.clone());
        Ticket {
            key: key.clone(),
            generation: slot.generation,
            token,
            table: Arc::clone(&self.table),
        }
    }

    fn finish(&self, key: &K, generation: u64) {
        let mut table = self.table.lock();
        if let Some(slot) = table.slots.get_mut(key) {
            if slot.generation == generation {
                slot.in_flight = None;
            }
        }
    }

    /// Claims the timer `id` for firing. False if it was replaced or cancelled.
    fn take_timer(&self, key: &K, id: u64) -> bool {
        let mut table = self.table.lock();
        let Some(slot) = table.slots.get_mut(key) else {
            return false;
        };
        match &slot.timer {
            Some(timer) if timer.id == id && !timer.token.is_cancelled() => {
                slot.timer = None;
                true
            }
            _ => false,
        }
    }
}

/// Proof that a request was the latest under its key when it started.
pub struct Ticket<K> {
    key: K,
    generation: u64,
    token: CancellationToken,
    table: Arc<Mutex<KeyTable<K>>>,
}

impl<K: std::fmt::Debug> std::fmt::Debug for Ticket<K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ticket")
            .field("key", &self.key)
            .field("generation", &self.generation)
            .field("cancelled", &self.token.is_cancelled())
            .finish_non_exhaustive()
    }
}

impl<K> Ticket<K>
where
    K: Eq + Hash,
{
    #[must_use]
    pub fn key(&self) -> &K {
        &self.key
    }

    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[must_use]
    pub fn is_current(&self) -> bool {
        let table = self.table.lock();
        self.is_current_in(&table)
    }

    /// Runs `apply` only if this ticket is still the latest for its key.
    ///
    /// `apply` runs while the key table is locked, so no newer request can
    /// start between the check and the write. It must not call back into the
    /// coordinator.
    pub fn apply_if_current<R>(&self, apply: impl FnOnce() -> R) -> Option<R> {
        let table = self.table.lock();
        if self.is_current_in(&table) {
            Some(apply())
        } else {
            None
        }
    }

    fn is_current_in(&self, table: &KeyTable<K>) -> bool {
        !self.token.is_cancelled()
            && table
                .slots
                .get(&self.key)
                .is_some_and(|slot| slot.generation == self.generation)
    }
}
