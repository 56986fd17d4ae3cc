//! Module: selector
//! Responsibility: row-value accessor contracts consumed by aggregators.
//! Does not own: column storage or cursor advancement policy.
//! Boundary: the only way aggregators observe the current row.

pub mod memory;

use crate::record::TimedValue;
use std::sync::Arc;

///
/// TimeSelector
///
/// Reads the event time of the current row.
///

pub trait TimeSelector {
    fn current_time(&self) -> i64;
}

///
/// ValueSelector
///
/// Reads the value of the current row; `None` is a null cell.
///

pub trait ValueSelector<V> {
    fn current_value(&self) -> Option<V>;
}

///
/// RecordSelector
///
/// Reads an already-combined intermediate record from the current row.
/// `None` means the prior phase produced no record for this row.
///

pub trait RecordSelector<V> {
    fn current_record(&self) -> Option<TimedValue<V>>;
}

///
/// Selector
///
/// A bound column accessor, or `Nil` when the column is statically known
/// to hold no data for this partition. Factories branch on `Nil` to skip
/// binding a real aggregator.
///

pub enum Selector<S: ?Sized> {
    Nil,
    Column(Arc<S>),
}

impl<S: ?Sized> Selector<S> {
    #[must_use]
    pub const fn is_nil(&self) -> bool {
        matches!(self, Self::Nil)
    }
}

impl<S: ?Sized> Clone for Selector<S> {
    fn clone(&self) -> Self {
        match self {
            Self::Nil => Self::Nil,
            Self::Column(inner) => Self::Column(Arc::clone(inner)),
        }
    }
}

impl<S: ?Sized> std::fmt::Debug for Selector<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Nil => f.write_str("Selector::Nil"),
            Self::Column(_) => f.write_str("Selector::Column"),
        }
    }
}

impl Selector<dyn TimeSelector> {
    /// Time of the current row; a nil time column reads as zero.
    #[must_use]
    pub fn read_time(&self) -> i64 {
        match self {
            Self::Nil => 0,
            Self::Column(selector) => selector.current_time(),
        }
    }
}

///
/// ColumnSelectorFactory
///
/// Hands out selectors for named columns of the partition being aggregated.
/// Unknown columns come back as `Selector::Nil`.
///

pub trait ColumnSelectorFactory<V> {
    fn make_time_selector(&self, column: &str) -> Selector<dyn TimeSelector>;

    fn make_value_selector(&self, column: &str) -> Selector<dyn ValueSelector<V>>;

    fn make_record_selector(&self, column: &str) -> Selector<dyn RecordSelector<V>>;
}
