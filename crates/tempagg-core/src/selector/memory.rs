//! In-memory columns with a shared row cursor.
//!
//! Used to drive aggregators over materialized row batches: every selector
//! handed out by one [`InMemoryColumns`] reads the row its [`RowCursor`]
//! currently points at.

use crate::{
    record::TimedValue,
    selector::{
        ColumnSelectorFactory, RecordSelector, Selector, TimeSelector, ValueSelector,
    },
};
use std::{
    collections::BTreeMap,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
};

///
/// RowCursor
///

#[derive(Clone, Debug, Default)]
pub struct RowCursor {
    position: Arc<AtomicUsize>,
}

impl RowCursor {
    #[must_use]
    pub fn position(&self) -> usize {
        self.position.load(Ordering::Relaxed)
    }

    pub fn advance(&self) {
        self.position.fetch_add(1, Ordering::Relaxed);
    }

    pub fn reset(&self) {
        self.position.store(0, Ordering::Relaxed);
    }
}

///
/// InMemoryColumns
///

#[derive(Debug)]
pub struct InMemoryColumns<V> {
    cursor: RowCursor,
    rows: usize,
    times: BTreeMap<String, Arc<Vec<i64>>>,
    values: BTreeMap<String, Arc<Vec<Option<V>>>>,
    records: BTreeMap<String, Arc<Vec<Option<TimedValue<V>>>>>,
}

impl<V> InMemoryColumns<V> {
    #[must_use]
    pub fn new(rows: usize) -> Self {
        Self {
            cursor: RowCursor::default(),
            rows,
            times: BTreeMap::new(),
            values: BTreeMap::new(),
            records: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_time_column(mut self, name: &str, times: Vec<i64>) -> Self {
        self.times.insert(name.to_string(), Arc::new(times));
        self
    }

    #[must_use]
    pub fn with_value_column(mut self, name: &str, values: Vec<Option<V>>) -> Self {
        self.values.insert(name.to_string(), Arc::new(values));
        self
    }

    #[must_use]
    pub fn with_record_column(mut self, name: &str, records: Vec<Option<TimedValue<V>>>) -> Self {
        self.records.insert(name.to_string(), Arc::new(records));
        self
    }

    #[must_use]
    pub fn cursor(&self) -> RowCursor {
        self.cursor.clone()
    }

    #[must_use]
    pub const fn rows(&self) -> usize {
        self.rows
    }

    /// Run `f` once per row, advancing the cursor after each call.
    pub fn for_each_row(&self, mut f: impl FnMut(usize)) {
        self.cursor.reset();
        for row in 0..self.rows {
            f(row);
            self.cursor.advance();
        }
    }
}

struct ColumnRef<T> {
    cursor: RowCursor,
    data: Arc<Vec<T>>,
}

impl<T> ColumnRef<T> {
    fn current(&self) -> Option<&T> {
        self.data.get(self.cursor.position())
    }
}

impl TimeSelector for ColumnRef<i64> {
    fn current_time(&self) -> i64 {
        self.current().copied().unwrap_or_default()
    }
}

impl<V: Clone> ValueSelector<V> for ColumnRef<Option<V>> {
    fn current_value(&self) -> Option<V> {
        self.current().cloned().flatten()
    }
}

impl<V: Clone> RecordSelector<V> for ColumnRef<Option<TimedValue<V>>> {
    fn current_record(&self) -> Option<TimedValue<V>> {
        self.current().cloned().flatten()
    }
}

impl<V: Clone + 'static> ColumnSelectorFactory<V> for InMemoryColumns<V> {
    fn make_time_selector(&self, column: &str) -> Selector<dyn TimeSelector> {
        match self.times.get(column) {
            Some(data) => Selector::Column(Arc::new(ColumnRef {
                cursor: self.cursor(),
                data: Arc::clone(data),
            })),
            None => Selector::Nil,
        }
    }

    fn make_value_selector(&self, column: &str) -> Selector<dyn ValueSelector<V>> {
        match self.values.get(column) {
            Some(data) => Selector::Column(Arc::new(ColumnRef {
                cursor: self.cursor(),
                data: Arc::clone(data),
            })),
            None => Selector::Nil,
        }
    }

    fn make_record_selector(&self, column: &str) -> Selector<dyn RecordSelector<V>> {
        match self.records.get(column) {
            Some(data) => Selector::Column(Arc::new(ColumnRef {
                cursor: self.cursor(),
                data: Arc::clone(data),
            })),
            None => Selector::Nil,
        }
    }
}

///
/// TESTS
///
