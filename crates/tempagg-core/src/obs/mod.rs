//! Observability: runtime telemetry (metrics) and sink abstractions.
//!
//! Nothing here runs on the per-row hot path; aggregators report only
//! binding, relocation, and compaction events.

pub(crate) mod metrics;
pub(crate) mod sink;

// re-exports
pub use metrics::{EventOps, EventReport};
pub use sink::{
    AggregatorShape, MetricsEvent, MetricsSink, metrics_report, metrics_reset_all,
    with_metrics_sink,
};
