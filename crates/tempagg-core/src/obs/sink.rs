//! Metrics sink boundary.
//!
//! Aggregation logic MUST NOT depend on obs::metrics directly.
//! All instrumentation flows through MetricsEvent and MetricsSink.
//!
//! This module is the only allowed bridge between aggregation logic
//! and the thread-local metrics state.
use crate::{aggregate::InputKind, obs::metrics};
use std::cell::RefCell;

thread_local! {
    static SINK_OVERRIDE: RefCell<Option<*const dyn MetricsSink>> = RefCell::new(None);
}

///
/// AggregatorShape
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AggregatorShape {
    Row,
    Buffer,
}

///
/// MetricsEvent
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MetricsEvent {
    Factorized {
        shape: AggregatorShape,
        input: InputKind,
    },
    SlotRelocated,
    ArenaCompacted {
        live_slots: u64,
        reclaimed_bytes: u64,
    },
}

///
/// MetricsSink
///

pub trait MetricsSink {
    fn record(&self, event: MetricsEvent);
}

/// GlobalMetricsSink
/// Default thread-local sink that writes into the metrics counters.
/// Acts as the concrete sink when no scoped override is installed.

pub(crate) struct GlobalMetricsSink;

impl MetricsSink for GlobalMetricsSink {
    fn record(&self, event: MetricsEvent) {
        match event {
            MetricsEvent::Factorized { shape, input } => {
                metrics::with_state_mut(|m| {
                    match shape {
                        AggregatorShape::Row => {
                            m.ops.row_aggregators = m.ops.row_aggregators.saturating_add(1);
                        }
                        AggregatorShape::Buffer => {
                            m.ops.buffer_aggregators = m.ops.buffer_aggregators.saturating_add(1);
                        }
                    }

                    match input {
                        InputKind::Nil => {
                            m.ops.nil_short_circuits = m.ops.nil_short_circuits.saturating_add(1);
                        }
                        InputKind::Raw => m.ops.raw_inputs = m.ops.raw_inputs.saturating_add(1),
                        InputKind::Combined => {
                            m.ops.combined_inputs = m.ops.combined_inputs.saturating_add(1);
                        }
                    }
                });
            }

            MetricsEvent::SlotRelocated => {
                metrics::with_state_mut(|m| {
                    m.ops.slot_relocations = m.ops.slot_relocations.saturating_add(1);
                });
            }

            MetricsEvent::ArenaCompacted {
                live_slots,
                reclaimed_bytes,
            } => {
                metrics::with_state_mut(|m| {
                    m.ops.arena_compactions = m.ops.arena_compactions.saturating_add(1);
                    m.ops.compacted_live_slots =
                        m.ops.compacted_live_slots.saturating_add(live_slots);
                    m.ops.reclaimed_bytes = m.ops.reclaimed_bytes.saturating_add(reclaimed_bytes);
                });
            }
        }
    }
}

pub(crate) const GLOBAL_METRICS_SINK: GlobalMetricsSink = GlobalMetricsSink;

pub(crate) fn record(event: MetricsEvent) {
    let override_ptr = SINK_OVERRIDE.with(|cell| *cell.borrow());
    if let Some(ptr) = override_ptr {
        // SAFETY:
        // - `ptr` was produced from a valid `&dyn MetricsSink` in `with_metrics_sink`.
        // - `with_metrics_sink` restores the previous pointer before returning,
        //   including unwind paths via `Guard::drop`.
        // - `record` is synchronous and never stores `ptr` beyond this call.
        unsafe { (&*ptr).record(event) };
    } else {
        GLOBAL_METRICS_SINK.record(event);
    }
}

/// Snapshot the current thread's metrics counters.
#[must_use]
pub fn metrics_report() -> metrics::EventReport {
    metrics::report()
}

/// Reset the current thread's metrics counters.
pub fn metrics_reset_all() {
    metrics::reset_all();
}

/// Run a closure with a temporary metrics sink override.
pub fn with_metrics_sink<T>(sink: &dyn MetricsSink, f: impl FnOnce() -> T) -> T {
    struct Guard(Option<*const dyn MetricsSink>);

    impl Drop for Guard {
        fn drop(&mut self) {
            SINK_OVERRIDE.with(|cell| {
                *cell.borrow_mut() = self.0;
            });
        }
    }

    // SAFETY:
    // - `sink_ptr` is installed only for this dynamic scope.
    // - `Guard` restores the previous slot on all exits, including panic.
    // - `record` only dereferences synchronously and never persists `sink_ptr`.
    let sink_ptr = unsafe { std::mem::transmute::<&dyn MetricsSink, *const dyn MetricsSink>(sink) };
    let prev = SINK_OVERRIDE.with(|cell| {
        let mut slot = cell.borrow_mut();
        slot.replace(sink_ptr)
    });
    let _guard = Guard(prev);

    f()
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[derive(Default)]
    struct CapturingSink {
        events: RefCell<Vec<MetricsEvent>>,
    }

    impl MetricsSink for CapturingSink {
        fn record(&self, event: MetricsEvent) {
            self.events.borrow_mut().push(event);
        }
    }

    #[test]
    fn override_sink_captures_events_and_bypasses_counters() {
        metrics_reset_all();
        let sink = CapturingSink::default();

        with_metrics_sink(&sink, || record(MetricsEvent::SlotRelocated));

        assert_eq!(sink.events.borrow().as_slice(), &[MetricsEvent::SlotRelocated]);
        assert_eq!(metrics_report().ops.slot_relocations, 0);
    }

    #[test]
    fn global_sink_counts_factorize_events() {
        metrics_reset_all();

        record(MetricsEvent::Factorized {
            shape: AggregatorShape::Buffer,
            input: InputKind::Nil,
        });
        record(MetricsEvent::ArenaCompacted {
            live_slots: 3,
            reclaimed_bytes: 34,
        });

        let ops = metrics_report().ops;
        assert_eq!(ops.buffer_aggregators, 1);
        assert_eq!(ops.nil_short_circuits, 1);
        assert_eq!(ops.arena_compactions, 1);
        assert_eq!(ops.compacted_live_slots, 3);
        assert_eq!(ops.reclaimed_bytes, 34);
    }

    #[test]
    fn override_is_restored_after_scope() {
        metrics_reset_all();
        let sink = CapturingSink::default();

        with_metrics_sink(&sink, || {});
        record(MetricsEvent::SlotRelocated);

        assert!(sink.events.borrow().is_empty());
        assert_eq!(metrics_report().ops.slot_relocations, 1);
    }
}
