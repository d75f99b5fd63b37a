use metrics::{describe_counter, describe_gauge};

/// Register descriptions for the monitor's metrics. Recording is a no-op
/// until the embedding application installs a recorder.
pub fn describe_metrics() {
    describe_counter!("polywatch_cycles_total", "Fetch-and-evaluate cycles run");
    describe_counter!("polywatch_updates_total", "Snapshots delivered to the observer");
    describe_counter!("polywatch_cycle_errors_total", "Cycles that ended in an error");
    describe_counter!(
        "polywatch_fetch_fallbacks_total",
        "List requests retried with the fallback request shape"
    );
    describe_counter!(
        "polywatch_fetch_failures_total",
        "Per-cycle fetches replaced with an empty set"
    );
    describe_gauge!("polywatch_open_positions", "Open positions in the latest snapshot");
}
