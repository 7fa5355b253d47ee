//! Metric names and descriptions.
//!
//! The libraries only talk to the `metrics` facade. Nothing is recorded
//! until the host installs a recorder (the demo binary installs the
//! Prometheus one); until then every call is a no-op.
//!
//! # Example
//!
//! ```
//! use composable_board_runtime::metrics::describe_metrics;
//!
//! // Safe to call with or without a recorder installed.
//! describe_metrics();
//! ```

use metrics::{describe_counter, describe_histogram};
use std::time::Duration;

// Re-export metrics macros for use in other modules
pub use metrics::{counter, histogram};

/// Actions sent to a store
pub const COMMANDS_TOTAL: &str = "store.commands.total";
/// Actions the reducer rejected
pub const COMMANDS_REJECTED: &str = "store.commands.rejected";
/// Reducer wall time per action
pub const REDUCER_DURATION: &str = "store.reducer.duration_seconds";
pub use composable_board_projections::memo::{CACHE_EVICTED, SELECTOR_HIT, SELECTOR_MISS};

/// Register descriptions for every metric the workspace emits
///
/// Call once after installing a recorder so exporters can show help text.
pub fn describe_metrics() {
    // Store Metrics
    describe_counter!(COMMANDS_TOTAL, "Total number of actions sent to the store");
    describe_counter!(
        COMMANDS_REJECTED,
        "Total number of actions rejected by the reducer"
    );
    describe_histogram!(REDUCER_DURATION, "Time taken to reduce one action");

    // View Cache Metrics
    describe_counter!(
        SELECTOR_HIT,
        "Selector calls answered from a cache slot, by selector"
    );
    describe_counter!(
        SELECTOR_MISS,
        "Selector calls that recomputed their view, by selector"
    );
    describe_counter!(CACHE_EVICTED, "View cache slots evicted, by selector");
}

/// Store metrics recorder.
pub struct StoreMetrics;

impl StoreMetrics {
    /// Record an action that reached the reducer.
    pub fn record_command(duration: Duration, accepted: bool) {
        counter!(COMMANDS_TOTAL).increment(1);
        histogram!(REDUCER_DURATION).record(duration.as_secs_f64());
        if !accepted {
            counter!(COMMANDS_REJECTED).increment(1);
        }
    }
}
