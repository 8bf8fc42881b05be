use metrics::{counter, gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Install the Prometheus exporter and register all application metrics.
/// Returns a `PrometheusHandle` whose `render()` method produces the
/// text/plain Prometheus scrape payload.
pub fn init_metrics() -> PrometheusHandle {
    let builder = PrometheusBuilder::new();
    let handle = builder
        .install_recorder()
        .expect("failed to install Prometheus recorder");

    // Pre-register counters so they appear even before the first increment.
    counter!("bets_recorded_total").absolute(0);
    counter!("bets_duplicate_total").absolute(0);
    counter!("payouts_recorded_total").absolute(0);
    counter!("payouts_duplicate_total").absolute(0);
    counter!("verification_failures_total").absolute(0);
    counter!("markets_resolved_total").absolute(0);
    counter!("sync_runs_total").absolute(0);

    // Pre-register gauges at zero.
    gauge!("markets_discovered").set(0.0);

    handle
}
