use crate::{
    aggregate::input::{AggregatorInput, InputKind},
    direction::Direction,
    record::TimedValue,
    value::{ScalarValue, ValueLimits},
};

///
/// RowAggregator
///
/// Heap-resident accumulator for one grouping key.
/// Holds the winning intermediate record directly; `None` until a row has
/// been aggregated. Equal times never overwrite, so the first row seen at
/// the winning time is kept.
///

#[derive(Debug)]
pub struct RowAggregator<V> {
    direction: Direction,
    input: AggregatorInput<V>,
    limits: ValueLimits,
    state: Option<TimedValue<V>>,
}

impl<V: ScalarValue> RowAggregator<V> {
    pub(crate) const fn new(
        direction: Direction,
        input: AggregatorInput<V>,
        limits: ValueLimits,
    ) -> Self {
        Self {
            direction,
            input,
            limits,
            state: None,
        }
    }

    /// Fold the current row into this aggregator.
    pub fn aggregate(&mut self) {
        let current = self.state.as_ref().map(|record| record.time);
        if let Some(winner) = self.input.candidate(self.direction, current, self.limits) {
            self.state = Some(winner);
        }
    }

    /// Snapshot of the intermediate record, `None` if no row was aggregated.
    #[must_use]
    pub fn get(&self) -> Option<TimedValue<V>> {
        self.state.clone()
    }

    /// Winning value, `None` for an absent record or a null value.
    #[must_use]
    pub fn get_value(&self) -> Option<V> {
        self.state.as_ref().and_then(|record| record.value.clone())
    }

    #[must_use]
    pub fn into_record(self) -> Option<TimedValue<V>> {
        self.state
    }

    #[must_use]
    pub const fn input_kind(&self) -> InputKind {
        self.input.kind()
    }

    #[must_use]
    pub const fn direction(&self) -> Direction {
        self.direction
    }

    /// Row aggregators hold no external resources.
    pub const fn close(&mut self) {}
}
