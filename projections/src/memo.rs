//! Per-key single-slot memoization.
//!
//! A [`MemoSelector`] remembers, for every key it has been called with, the
//! inputs of the last call and the result computed from them. A call whose
//! inputs are all the [`same`](crate::Identity::same) as the remembered ones
//! returns the remembered result (an `Arc` clone, so the caller sees the
//! identical pointer) without running the compute closure.
//!
//! # Slots
//!
//! Each key owns exactly one slot. There is no LRU: a write that touches one
//! column replaces that column's slot and leaves every sibling's slot alone.
//! Slots of keys that disappear from the store are kept until someone evicts
//! them ([`MemoSelector::evict`], [`MemoSelector::retain`], or
//! [`BoardViews::prune`](crate::BoardViews::prune)).
//!
//! # Purity
//!
//! Compute closures must be deterministic functions of their inputs with no
//! side effects. Caching is only correct if "same inputs ⇒ same output".
//!
//! # Concurrency
//!
//! The slot map sits behind a `Mutex`. The lock is released while the compute
//! closure runs. If another thread stored a slot with the same inputs in the
//! meantime, that result wins and ours is dropped, so every caller for one
//! key and one snapshot observes the same `Arc`.

use crate::identity::Identity;
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Selector calls answered from a cache slot
pub const SELECTOR_HIT: &str = "board_views.selector.hit";
/// Selector calls that recomputed
pub const SELECTOR_MISS: &str = "board_views.selector.miss";
/// Cache slots dropped by pruning or explicit eviction
pub const CACHE_EVICTED: &str = "board_views.cache.evicted";

/// Names of the memoized selectors, used in logs and metrics labels
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SelectorId {
    /// Sorted tasks of a column
    TasksOfColumn,
    /// Column with resolved tasks
    NestedColumn,
    /// Board with resolved columns
    NestedBoard,
    /// Move-target list of a column's tasks
    TaskPositionsOfColumn,
    /// Move-target list of a board's columns
    ColumnPositionsOfBoard,
}

impl SelectorId {
    /// Stable label
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TasksOfColumn => "tasks_of_column",
            Self::NestedColumn => "nested_column",
            Self::NestedBoard => "nested_board",
            Self::TaskPositionsOfColumn => "task_positions_of_column",
            Self::ColumnPositionsOfBoard => "column_positions_of_board",
        }
    }
}

impl std::fmt::Display for SelectorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration shared by the selectors of one [`BoardViews`](crate::BoardViews)
///
/// # Example
///
/// ```
/// use composable_board_projections::ViewCacheConfig;
///
/// let config = ViewCacheConfig::default()
///     .with_max_slots_per_selector(10_000)
///     .with_metrics(false);
/// assert_eq!(config.max_slots_per_selector, Some(10_000));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ViewCacheConfig {
    /// Soft budget per selector; crossing it logs a warning, nothing is evicted
    pub max_slots_per_selector: Option<usize>,
    /// Emit `metrics` counters for hits, misses and evictions
    pub record_metrics: bool,
}

impl ViewCacheConfig {
    /// Set the soft slot budget
    #[must_use]
    pub const fn with_max_slots_per_selector(mut self, max: usize) -> Self {
        self.max_slots_per_selector = Some(max);
        self
    }

    /// Enable or disable metrics
    #[must_use]
    pub const fn with_metrics(mut self, enabled: bool) -> Self {
        self.record_metrics = enabled;
        self
    }
}

impl Default for ViewCacheConfig {
    fn default() -> Self {
        Self {
            max_slots_per_selector: None,
            record_metrics: true,
        }
    }
}

/// Counters of one selector at a point in time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    /// Which selector
    pub selector: SelectorId,
    /// Live slots
    pub slots: usize,
    /// Calls answered from a slot
    pub hits: u64,
    /// Calls that ran the compute closure
    pub misses: u64,
    /// Slots removed by eviction
    pub evictions: u64,
}

impl CacheStats {
    /// Fraction of calls answered from a slot; `0.0` before the first call
    #[must_use]
    #[allow(clippy::cast_precision_loss)] // Ratio only
    pub fn hit_ratio(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

struct Slot<I, O> {
    inputs: I,
    result: O,
}

/// A memoized selector with one cache slot per key
///
/// # Type Parameters
///
/// - `K`: The key (usually an entity id)
/// - `I`: The input tuple compared with [`Identity`]
/// - `O`: The result; cloning it must preserve identity (an `Arc` or
///   `Option<Arc<_>>`)
pub struct MemoSelector<K, I, O> {
    id: SelectorId,
    config: ViewCacheConfig,
    slots: Mutex<HashMap<K, Slot<I, O>>>,
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
}

impl<K, I, O> MemoSelector<K, I, O>
where
    K: Eq + Hash + Debug,
    I: Identity,
    O: Clone,
{
    /// Create an empty selector with default configuration
    #[must_use]
    pub fn new(id: SelectorId) -> Self {
        Self::with_config(id, ViewCacheConfig::default())
    }

    /// Create an empty selector
    #[must_use]
    pub fn with_config(id: SelectorId, config: ViewCacheConfig) -> Self {
        Self {
            id,
            config,
            slots: Mutex::new(HashMap::new()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<K, Slot<I, O>>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Return the cached result for `key` if `inputs` are the same as last
    /// time, otherwise run `compute` and remember its result
    pub fn select<F>(&self, key: K, inputs: I, compute: F) -> O
    where
        F: FnOnce(&I) -> O,
    {
        if let Some(slot) = self.lock().get(&key) {
            if slot.inputs.same(&inputs) {
                self.hits.fetch_add(1, Ordering::Relaxed);
                if self.config.record_metrics {
                    metrics::counter!(SELECTOR_HIT, "selector" => self.id.as_str())
                        .increment(1);
                }
                tracing::trace!(selector = %self.id, ?key, "Selector cache hit");
                return slot.result.clone();
            }
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        if self.config.record_metrics {
            metrics::counter!(SELECTOR_MISS, "selector" => self.id.as_str())
                .increment(1);
        }
        tracing::trace!(selector = %self.id, ?key, "Selector cache miss, recomputing");

        let result = compute(&inputs);

        let mut slots = self.lock();
        if let Some(slot) = slots.get(&key) {
            if slot.inputs.same(&inputs) {
                return slot.result.clone();
            }
        }
        slots.insert(
            key,
            Slot {
                inputs,
                result: result.clone(),
            },
        );
        if let Some(max) = self.config.max_slots_per_selector {
            if slots.len() > max {
                tracing::warn!(
                    selector = %self.id,
                    slots = slots.len(),
                    max,
                    "View cache is over its slot budget"
                );
            }
        }
        result
    }

    /// Drop the slot of `key`; returns whether one existed
    pub fn evict(&self, key: &K) -> bool {
        let removed = self.lock().remove(key).is_some();
        if removed {
            self.record_evictions(1);
        }
        removed
    }

    /// Keep only the slots whose key satisfies `keep`; returns how many were
    /// dropped
    pub fn retain<F>(&self, mut keep: F) -> usize
    where
        F: FnMut(&K) -> bool,
    {
        let mut slots = self.lock();
        let before = slots.len();
        slots.retain(|key, _| keep(key));
        let evicted = before - slots.len();
        drop(slots);
        self.record_evictions(evicted);
        evicted
    }

    /// Drop every slot
    pub fn clear(&self) {
        let evicted = {
            let mut slots = self.lock();
            let len = slots.len();
            slots.clear();
            len
        };
        self.record_evictions(evicted);
    }

    /// Number of live slots
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Check if there are no slots
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of the counters
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            selector: self.id,
            slots: self.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
        }
    }

    fn record_evictions(&self, count: usize) {
        if count == 0 {
            return;
        }
        self.evictions.fetch_add(count as u64, Ordering::Relaxed);
        if self.config.record_metrics {
            metrics::counter!(CACHE_EVICTED, "selector" => self.id.as_str())
                .increment(count as u64);
        }
    }
}

impl<K, I, O> std::fmt::Debug for MemoSelector<K, I, O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoSelector")
            .field("id", &self.id)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::sync::Arc;

    fn selector() -> MemoSelector<u64, Arc<String>, Arc<usize>> {
        MemoSelector::with_config(SelectorId::NestedColumn, ViewCacheConfig::default().with_metrics(false))
    }

    #[test]
    fn same_inputs_skip_recompute() {
        let memo = selector();
        let input = Arc::new(String::from("abc"));
        let runs = Cell::new(0);

        let first = memo.select(1, Arc::clone(&input), |s| {
            runs.set(runs.get() + 1);
            Arc::new(s.len())
        });
        let second = memo.select(1, Arc::clone(&input), |s| {
            runs.set(runs.get() + 1);
            Arc::new(s.len())
        });

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(runs.get(), 1);
        assert_eq!(memo.stats().hits, 1);
        assert_eq!(memo.stats().misses, 1);
    }

    #[test]
    fn new_input_reference_recomputes_even_if_equal_by_value() {
        let memo = selector();
        let first = memo.select(1, Arc::new(String::from("abc")), |s| Arc::new(s.len()));
        let second = memo.select(1, Arc::new(String::from("abc")), |s| Arc::new(s.len()));
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(*first, *second);
    }

    #[test]
    fn keys_have_independent_slots() {
        let memo = selector();
        let a = Arc::new(String::from("a"));
        let b = Arc::new(String::from("bb"));

        let first_a = memo.select(1, Arc::clone(&a), |s| Arc::new(s.len()));
        memo.select(2, Arc::clone(&b), |s| Arc::new(s.len()));
        memo.select(2, Arc::new(String::from("ccc")), |s| Arc::new(s.len()));
        let again_a = memo.select(1, a, |s| Arc::new(s.len()));

        assert!(Arc::ptr_eq(&first_a, &again_a));
        assert_eq!(memo.len(), 2);
    }

    #[test]
    fn eviction_forgets_the_slot() {
        let memo = selector();
        let input = Arc::new(String::from("abc"));
        let first = memo.select(7, Arc::clone(&input), |s| Arc::new(s.len()));

        assert!(memo.evict(&7));
        assert!(!memo.evict(&7));
        let second = memo.select(7, input, |s| Arc::new(s.len()));

        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(memo.stats().evictions, 1);
    }

    #[test]
    fn retain_reports_dropped_slots() {
        let memo = selector();
        for key in 0..5 {
            memo.select(key, Arc::new(String::new()), |_| Arc::new(0));
        }
        assert_eq!(memo.retain(|key| key % 2 == 0), 2);
        assert_eq!(memo.len(), 3);

        memo.clear();
        assert!(memo.is_empty());
        assert_eq!(memo.stats().evictions, 5);
    }

    #[test]
    fn hit_ratio_handles_no_calls() {
        let stats = selector().stats();
        assert!(stats.hit_ratio().abs() < f64::EPSILON);
    }
}
