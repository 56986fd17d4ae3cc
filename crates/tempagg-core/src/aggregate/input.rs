//! Module: aggregate::input
//! Responsibility: the per-aggregator input strategy (nil, raw columns, combined records).
//! Does not own: where the winning record is stored.
//! Boundary: shared candidate selection for row and buffer aggregators.

use crate::{
    direction::Direction,
    record::TimedValue,
    selector::{RecordSelector, Selector, TimeSelector, ValueSelector},
    value::{ScalarValue, ValueLimits},
};
use std::sync::Arc;

///
/// InputKind
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum InputKind {
    Nil,
    Raw,
    Combined,
}

///
/// AggregatorInput
///
/// Strategy chosen once at factorize time.
/// `Nil` is stateless: every aggregate call is a no-op.
/// `Raw` reads a time column and a value column.
/// `Combined` reads intermediate records produced by an earlier phase.
///

pub enum AggregatorInput<V> {
    Nil,
    Raw {
        time: Selector<dyn TimeSelector>,
        value: Arc<dyn ValueSelector<V>>,
    },
    Combined {
        records: Arc<dyn RecordSelector<V>>,
    },
}

impl<V> AggregatorInput<V> {
    /// Bind raw columns; a nil value column short-circuits to `Nil`.
    #[must_use]
    pub fn raw(time: Selector<dyn TimeSelector>, value: Selector<dyn ValueSelector<V>>) -> Self {
        match value {
            Selector::Nil => Self::Nil,
            Selector::Column(value) => Self::Raw { time, value },
        }
    }

    /// Bind a combined-record column; a nil column short-circuits to `Nil`.
    #[must_use]
    pub fn combined(records: Selector<dyn RecordSelector<V>>) -> Self {
        match records {
            Selector::Nil => Self::Nil,
            Selector::Column(records) => Self::Combined { records },
        }
    }

    #[must_use]
    pub const fn kind(&self) -> InputKind {
        match self {
            Self::Nil => InputKind::Nil,
            Self::Raw { .. } => InputKind::Raw,
            Self::Combined { .. } => InputKind::Combined,
        }
    }
}

impl<V: ScalarValue> AggregatorInput<V> {
    /// Read the current row and return it if it beats `current`.
    ///
    /// `current` is the stored time, or `None` when nothing has been stored.
    /// The value column is only read once the time has won.
    pub(crate) fn candidate(
        &self,
        direction: Direction,
        current: Option<i64>,
        limits: ValueLimits,
    ) -> Option<TimedValue<V>> {
        let wins = |time: i64| current.is_none_or(|current| direction.supersedes(time, current));

        match self {
            Self::Nil => None,
            Self::Raw { time, value } => {
                let time = time.read_time();
                wins(time).then(|| {
                    TimedValue::new(time, value.current_value().map(|v| v.fit(limits)))
                })
            }
            Self::Combined { records } => {
                let record = records.current_record()?;
                wins(record.time).then(|| {
                    TimedValue::new(record.time, record.value.map(|v| v.fit(limits)))
                })
            }
        }
    }
}

impl<V> std::fmt::Debug for AggregatorInput<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AggregatorInput::{:?}", self.kind())
    }
}
