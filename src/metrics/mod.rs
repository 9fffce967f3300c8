// Private module declaration
mod server;

use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry, TextEncoder,
};

// Re-export for public API
pub use server::configure;

// ============================================================================
// Metrics Module - Prometheus metrics for observability
// ============================================================================
//
// Provides metrics for:
// - Order lifecycle throughput (created, updated, cancelled)
// - Operation latency and failures by reason
// - Order-number allocation conflicts
//
// All metrics are registered with Prometheus and can be scraped via /metrics
// ============================================================================

pub struct Metrics {
    registry: Registry,

    // Lifecycle Metrics
    pub orders_created: IntCounter,
    pub order_updates: IntCounter,
    pub orders_cancelled: IntCounterVec,

    // Operation Metrics
    pub operation_failures: IntCounterVec,
    pub operation_duration: HistogramVec,

    // Allocation Metrics
    pub order_number_conflicts: IntCounter,
}

impl Metrics {
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        // Lifecycle Metrics
        let orders_created = IntCounter::new("orders_created_total", "Total orders created")?;
        registry.register(Box::new(orders_created.clone()))?;

        let order_updates = IntCounter::new("order_updates_total", "Total partial updates applied")?;
        registry.register(Box::new(order_updates.clone()))?;

        let orders_cancelled = IntCounterVec::new(
            Opts::new("orders_cancelled_total", "Total cancel requests by outcome"),
            &["outcome"],
        )?;
        registry.register(Box::new(orders_cancelled.clone()))?;

        // Operation Metrics
        let operation_failures = IntCounterVec::new(
            Opts::new("order_operation_failures_total", "Failed order operations"),
            &["operation", "reason"],
        )?;
        registry.register(Box::new(operation_failures.clone()))?;

        let operation_duration = HistogramVec::new(
            HistogramOpts::new("order_operation_duration_seconds", "Order operation duration")
                .buckets(vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0]),
            &["operation"],
        )?;
        registry.register(Box::new(operation_duration.clone()))?;

        // Allocation Metrics
        let order_number_conflicts = IntCounter::new(
            "order_number_conflicts_total",
            "Order-number allocations that collided and were retried",
        )?;
        registry.register(Box::new(order_number_conflicts.clone()))?;

        Ok(Self {
            registry,
            orders_created,
            order_updates,
            orders_cancelled,
            operation_failures,
            operation_duration,
            order_number_conflicts,
        })
    }

    /// Get the Prometheus registry for exposing metrics via HTTP
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Render every registered metric in the Prometheus text format
    pub fn encode_text(&self) -> anyhow::Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }

    /// Helper to record the latency of an operation, successful or not
    pub fn observe_duration(&self, operation: &str, duration_secs: f64) {
        self.operation_duration.with_label_values(&[operation]).observe(duration_secs);
    }

    /// Helper to record a failed operation
    pub fn record_failure(&self, operation: &str, reason: &str) {
        self.operation_failures.with_label_values(&[operation, reason]).inc();
    }

    /// Helper to record a cancel request; `changed` is false for repeat cancels
    pub fn record_cancel(&self, changed: bool) {
        let outcome = if changed { "cancelled" } else { "already_cancelled" };
        self.orders_cancelled.with_label_values(&[outcome]).inc();
    }

    pub fn record_order_number_conflict(&self) {
        self.order_number_conflicts.inc();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_creation() {
        let metrics = Metrics::new().unwrap();
        assert!(!metrics.registry().gather().is_empty());
    }

    #[test]
    fn test_lifecycle_counters_in_text_output() {
        let metrics = Metrics::new().unwrap();
        metrics.orders_created.inc();
        metrics.orders_created.inc();
        metrics.record_cancel(true);
        metrics.record_cancel(false);
        metrics.record_order_number_conflict();

        let text = metrics.encode_text().unwrap();
        assert!(text.contains("orders_created_total 2"));
        assert!(text.contains(r#"orders_cancelled_total{outcome="cancelled"} 1"#));
        assert!(text.contains(r#"orders_cancelled_total{outcome="already_cancelled"} 1"#));
        assert!(text.contains("order_number_conflicts_total 1"));
    }

    #[test]
    fn test_record_failure_and_duration() {
        let metrics = Metrics::new().unwrap();
        metrics.record_failure("get", "not_found");
        metrics.observe_duration("get", 0.002);

        let text = metrics.encode_text().unwrap();
        assert!(text.contains(r#"order_operation_failures_total{operation="get",reason="not_found"} 1"#));
        assert!(text.contains(r#"order_operation_duration_seconds_count{operation="get"} 1"#));
    }
}
