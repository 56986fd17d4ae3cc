//! Module: arena
//! Responsibility: growable byte region holding fixed-width aggregation slots.
//! Does not own: slot contents or per-type layout.
//! Boundary: offsets are plain indices handed to buffer aggregators by value.

#[cfg(test)]
mod tests;

use crate::{
    error::InternalError,
    obs::sink::{self, MetricsEvent},
};
use derive_more::Display;
use serde::{Deserialize, Serialize};

///
/// SlotOffset
///
/// Byte offset of one slot inside an arena.
/// Offsets survive arena growth; only compaction moves them.
///

#[derive(
    Clone, Copy, Debug, Default, Deserialize, Display, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
pub struct SlotOffset(usize);

impl SlotOffset {
    #[must_use]
    pub const fn new(offset: usize) -> Self {
        Self(offset)
    }

    #[must_use]
    pub const fn get(self) -> usize {
        self.0
    }
}

///
/// SlotArena
///
/// Bump-allocated region of equally sized slots.
///

#[derive(Clone, Debug)]
pub struct SlotArena {
    bytes: Vec<u8>,
    slot_width: usize,
}

impl SlotArena {
    #[must_use]
    pub const fn new(slot_width: usize) -> Self {
        Self {
            bytes: Vec::new(),
            slot_width,
        }
    }

    #[must_use]
    pub const fn slot_width(&self) -> usize {
        self.slot_width
    }

    #[must_use]
    pub const fn slot_count(&self) -> usize {
        if self.slot_width == 0 {
            0
        } else {
            self.bytes.len() / self.slot_width
        }
    }

    #[must_use]
    pub const fn len_bytes(&self) -> usize {
        self.bytes.len()
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    #[must_use]
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.bytes
    }

    /// Append one zeroed slot and return its offset.
    /// The slot still has to be initialized by its aggregator.
    pub fn allocate(&mut self) -> SlotOffset {
        let offset = SlotOffset(self.bytes.len());
        self.bytes.resize(self.bytes.len() + self.slot_width, 0);

        offset
    }

    /// Reserve room for `additional` more slots without moving any offset.
    pub fn reserve(&mut self, additional: usize) {
        self.bytes
            .reserve(additional.saturating_mul(self.slot_width));
    }

    /// Move every live slot to the front of the region and drop the rest.
    ///
    /// Slots keep their relative order. The returned map lists the offset
    /// each live slot had before compaction and the offset it has now.
    pub fn compact(&mut self, live: &[SlotOffset]) -> Result<RelocationMap, InternalError> {
        let mut live = live.to_vec();
        live.sort_unstable();
        live.dedup();

        for offset in &live {
            self.check_offset(*offset)?;
        }

        let before = self.bytes.len();
        let mut moves = Vec::with_capacity(live.len());
        for (index, old) in live.into_iter().enumerate() {
            let new = SlotOffset(index * self.slot_width);
            if new != old {
                self.bytes
                    .copy_within(old.0..old.0 + self.slot_width, new.0);
            }
            moves.push((old, new));
        }

        self.bytes.truncate(moves.len() * self.slot_width);

        sink::record(MetricsEvent::ArenaCompacted {
            live_slots: moves.len() as u64,
            reclaimed_bytes: (before - self.bytes.len()) as u64,
        });

        Ok(RelocationMap { moves })
    }

    fn check_offset(&self, offset: SlotOffset) -> Result<(), InternalError> {
        let aligned = self.slot_width != 0 && offset.0 % self.slot_width == 0;
        if !aligned || offset.0 + self.slot_width > self.bytes.len() {
            return Err(InternalError::arena_internal(format!(
                "slot offset {offset} is not a live slot (width={}, len={})",
                self.slot_width,
                self.bytes.len()
            )));
        }

        Ok(())
    }
}

///
/// RelocationMap
///
/// Before/after offsets produced by one compaction, ordered by old offset.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct RelocationMap {
    moves: Vec<(SlotOffset, SlotOffset)>,
}

impl RelocationMap {
    /// New offset of the slot that lived at `old`, if it survived.
    #[must_use]
    pub fn get(&self, old: SlotOffset) -> Option<SlotOffset> {
        self.moves
            .binary_search_by_key(&old, |(from, _)| *from)
            .ok()
            .map(|index| self.moves[index].1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (SlotOffset, SlotOffset)> + '_ {
        self.moves.iter().copied()
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.moves.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }
}
