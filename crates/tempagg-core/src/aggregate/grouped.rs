//! Module: aggregate::grouped
//! Responsibility: keyed slot bookkeeping for buffer aggregation over one arena.
//! Does not own: slot byte layout or fold semantics.
//! Boundary: drives one buffer aggregator across many grouping keys.

use crate::{
    aggregate::buffer::BufferAggregator,
    arena::{RelocationMap, SlotArena, SlotOffset},
    error::InternalError,
    record::TimedValue,
    value::ScalarValue,
};
use std::collections::BTreeMap;

///
/// GroupedSlots
///
/// One slot per grouping key, created lazily on first aggregate.
/// Offsets are rewritten whenever the arena is compacted or rebuilt.
///

#[derive(Debug)]
pub struct GroupedSlots<K, V> {
    aggregator: BufferAggregator<V>,
    arena: SlotArena,
    slots: BTreeMap<K, SlotOffset>,
}

impl<K: Ord + Clone, V: ScalarValue> GroupedSlots<K, V> {
    #[must_use]
    pub fn new(aggregator: BufferAggregator<V>) -> Self {
        let arena = SlotArena::new(aggregator.layout().width());

        Self {
            aggregator,
            arena,
            slots: BTreeMap::new(),
        }
    }

    /// Fold the current row into the slot for `key`.
    pub fn aggregate(&mut self, key: K) {
        let at = match self.slots.get(&key) {
            Some(at) => *at,
            None => {
                let at = self.arena.allocate();
                self.aggregator.init(self.arena.as_bytes_mut(), at);
                self.slots.insert(key, at);
                at
            }
        };

        self.aggregator.aggregate(self.arena.as_bytes_mut(), at);
    }

    pub fn get(&self, key: &K) -> Result<Option<TimedValue<V>>, InternalError> {
        match self.slots.get(key) {
            Some(at) => self.aggregator.get(self.arena.as_bytes(), *at),
            None => Ok(None),
        }
    }

    /// Drop groups rejected by `keep` and compact the arena in place.
    pub fn retain(&mut self, mut keep: impl FnMut(&K) -> bool) -> Result<RelocationMap, InternalError> {
        self.slots.retain(|key, _| keep(key));

        let live: Vec<_> = self.slots.values().copied().collect();
        let map = self.arena.compact(&live)?;
        for at in self.slots.values_mut() {
            let old = *at;
            *at = map.get(old).ok_or_else(|| {
                InternalError::arena_internal(format!("live slot {old} lost during compaction"))
            })?;
        }

        Ok(map)
    }

    /// Copy every slot into a fresh arena sized for `reserve` extra groups.
    pub fn rebuild(&mut self, reserve: usize) {
        let mut fresh = SlotArena::new(self.arena.slot_width());
        fresh.reserve(self.slots.len() + reserve);

        for at in self.slots.values_mut() {
            let to = fresh.allocate();
            self.aggregator
                .relocate(self.arena.as_bytes(), *at, fresh.as_bytes_mut(), to);
            *at = to;
        }

        self.arena = fresh;
    }

    /// Emit every group with its intermediate record, ordered by key.
    pub fn into_records(self) -> Result<Vec<(K, Option<TimedValue<V>>)>, InternalError> {
        self.slots
            .iter()
            .map(|(key, at)| {
                self.aggregator
                    .get(self.arena.as_bytes(), *at)
                    .map(|record| (key.clone(), record))
            })
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    #[must_use]
    pub const fn arena(&self) -> &SlotArena {
        &self.arena
    }
}
