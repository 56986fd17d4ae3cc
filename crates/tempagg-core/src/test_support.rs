//! Shared fixtures for driving factories over in-memory rows.

use crate::{
    arena::SlotArena,
    factory::{TIME_COLUMN_NAME, TimedAggregatorFactory},
    record::TimedValue,
    selector::memory::InMemoryColumns,
    value::ScalarValue,
};

/// Column name used for values in fixtures.
pub(crate) const VALUE_COLUMN: &str = "value";

/// Build raw columns from `(time, value)` rows.
pub(crate) fn raw_rows<V: ScalarValue>(rows: &[(i64, Option<V>)]) -> InMemoryColumns<V> {
    InMemoryColumns::new(rows.len())
        .with_time_column(TIME_COLUMN_NAME, rows.iter().map(|(t, _)| *t).collect())
        .with_value_column(VALUE_COLUMN, rows.iter().map(|(_, v)| v.clone()).collect())
}

/// Build a combined-record column named `column`.
pub(crate) fn record_rows<V: ScalarValue>(
    column: &str,
    records: Vec<Option<TimedValue<V>>>,
) -> InMemoryColumns<V> {
    InMemoryColumns::new(records.len()).with_record_column(column, records)
}

/// Fold every row through a row aggregator.
pub(crate) fn fold_rows<V: ScalarValue>(
    factory: &TimedAggregatorFactory<V>,
    columns: &InMemoryColumns<V>,
) -> Option<TimedValue<V>> {
    let mut aggregator = factory.factorize(columns);
    columns.for_each_row(|_| aggregator.aggregate());

    aggregator.get()
}

/// Fold every row through a buffer aggregator into one fresh slot.
pub(crate) fn fold_buffered<V: ScalarValue>(
    factory: &TimedAggregatorFactory<V>,
    columns: &InMemoryColumns<V>,
) -> Option<TimedValue<V>> {
    let aggregator = factory.factorize_buffered(columns);
    let mut arena = SlotArena::new(aggregator.layout().width());
    let at = arena.allocate();

    aggregator.init(arena.as_bytes_mut(), at);
    columns.for_each_row(|_| aggregator.aggregate(arena.as_bytes_mut(), at));

    aggregator
        .get(arena.as_bytes(), at)
        .expect("fixture slot should decode")
}

/// Long `first` factory over the fixture columns.
pub(crate) fn long_first() -> TimedAggregatorFactory<i64> {
    TimedAggregatorFactory::first("out", VALUE_COLUMN, None).expect("fixture factory should build")
}

/// Long `last` factory over the fixture columns.
pub(crate) fn long_last() -> TimedAggregatorFactory<i64> {
    TimedAggregatorFactory::last("out", VALUE_COLUMN, None).expect("fixture factory should build")
}
