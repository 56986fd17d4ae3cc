//! Module: aggregate::buffer
//! Responsibility: fold intermediate records into fixed-width slots of a shared byte region.
//! Does not own: slot allocation, growth, or compaction.
//! Boundary: callers pass the region and a slot offset on every call.

use crate::{
    aggregate::input::{AggregatorInput, InputKind},
    arena::SlotOffset,
    direction::Direction,
    error::InternalError,
    obs::sink::{self, MetricsEvent},
    record::TimedValue,
    value::{ScalarValue, ValueLimits},
};

///
/// CONSTANTS
///

const TIME_OFFSET: usize = 0;
const FLAG_OFFSET: usize = TIME_OFFSET + size_of::<i64>();
const VALUE_OFFSET: usize = FLAG_OFFSET + size_of::<u8>();

/// Flag bit: the stored value is null.
const FLAG_VALUE_NULL: u8 = 0b01;

/// Flag bit: the slot has been initialized but never aggregated into.
const FLAG_EMPTY: u8 = 0b10;

///
/// SlotLayout
///
/// Byte layout of one slot: `[time: i64 BE][flags: u8][value region]`.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SlotLayout {
    value_width: usize,
}

impl SlotLayout {
    #[must_use]
    pub fn for_value<V: ScalarValue>(limits: ValueLimits) -> Self {
        Self {
            value_width: V::encoded_width(limits),
        }
    }

    /// Total slot width in bytes.
    #[must_use]
    pub const fn width(self) -> usize {
        VALUE_OFFSET + self.value_width
    }

    #[must_use]
    pub const fn value_width(self) -> usize {
        self.value_width
    }
}

///
/// BufferAggregator
///
/// Stateless view over slots owned by someone else.
/// One instance can serve any number of slots; offsets may change between
/// calls as long as the owner relocates slot bytes first.
///

#[derive(Debug)]
pub struct BufferAggregator<V> {
    direction: Direction,
    input: AggregatorInput<V>,
    limits: ValueLimits,
    layout: SlotLayout,
}

impl<V: ScalarValue> BufferAggregator<V> {
    pub(crate) fn new(direction: Direction, input: AggregatorInput<V>, limits: ValueLimits) -> Self {
        Self {
            direction,
            input,
            limits,
            layout: SlotLayout::for_value::<V>(limits),
        }
    }

    #[must_use]
    pub const fn layout(&self) -> SlotLayout {
        self.layout
    }

    #[must_use]
    pub const fn input_kind(&self) -> InputKind {
        self.input.kind()
    }

    /// Write the empty pattern: initial time, null + empty flags, zeroed value.
    pub fn init(&self, buf: &mut [u8], at: SlotOffset) {
        let slot = self.slot_mut(buf, at);

        slot[TIME_OFFSET..FLAG_OFFSET].copy_from_slice(&self.direction.initial_time().to_be_bytes());
        slot[FLAG_OFFSET] = FLAG_VALUE_NULL | FLAG_EMPTY;
        slot[VALUE_OFFSET..].fill(0);
    }

    /// Fold the current row into the slot at `at`.
    pub fn aggregate(&self, buf: &mut [u8], at: SlotOffset) {
        let slot = self.slot_mut(buf, at);
        let current = if slot[FLAG_OFFSET] & FLAG_EMPTY == 0 {
            Some(read_time(slot))
        } else {
            None
        };

        if let Some(winner) = self.input.candidate(self.direction, current, self.limits) {
            write_record(slot, &winner);
        }
    }

    /// Read the slot back into an intermediate record.
    /// An initialized slot that never won a row reads as `None`.
    pub fn get(&self, buf: &[u8], at: SlotOffset) -> Result<Option<TimedValue<V>>, InternalError> {
        let slot = self.slot(buf, at);
        let flags = slot[FLAG_OFFSET];
        if flags & FLAG_EMPTY != 0 {
            return Ok(None);
        }

        let value = if flags & FLAG_VALUE_NULL == 0 {
            Some(V::decode(&slot[VALUE_OFFSET..])?)
        } else {
            None
        };

        Ok(Some(TimedValue::new(read_time(slot), value)))
    }

    /// Store a record into the slot unconditionally.
    pub fn put(&self, buf: &mut [u8], at: SlotOffset, record: &TimedValue<V>) {
        let fitted = TimedValue::new(
            record.time,
            record.value.clone().map(|v| v.fit(self.limits)),
        );
        write_record(self.slot_mut(buf, at), &fitted);
    }

    /// Copy one slot byte-for-byte from `from` to `to`.
    pub fn relocate(&self, from: &[u8], from_at: SlotOffset, to: &mut [u8], to_at: SlotOffset) {
        let width = self.layout.width();
        self.slot_mut(to, to_at)
            .copy_from_slice(&from[from_at.get()..from_at.get() + width]);

        sink::record(MetricsEvent::SlotRelocated);
    }

    /// Move one slot inside the same region.
    pub fn relocate_within(&self, buf: &mut [u8], from_at: SlotOffset, to_at: SlotOffset) {
        let width = self.layout.width();
        buf.copy_within(from_at.get()..from_at.get() + width, to_at.get());

        sink::record(MetricsEvent::SlotRelocated);
    }

    /// Buffer aggregators hold no external resources.
    pub const fn close(&mut self) {}

    fn slot<'a>(&self, buf: &'a [u8], at: SlotOffset) -> &'a [u8] {
        &buf[at.get()..at.get() + self.layout.width()]
    }

    fn slot_mut<'a>(&self, buf: &'a mut [u8], at: SlotOffset) -> &'a mut [u8] {
        &mut buf[at.get()..at.get() + self.layout.width()]
    }
}

fn read_time(slot: &[u8]) -> i64 {
    let mut bytes = [0u8; size_of::<i64>()];
    bytes.copy_from_slice(&slot[TIME_OFFSET..FLAG_OFFSET]);

    i64::from_be_bytes(bytes)
}

fn write_record<V: ScalarValue>(slot: &mut [u8], record: &TimedValue<V>) {
    slot[TIME_OFFSET..FLAG_OFFSET].copy_from_slice(&record.time.to_be_bytes());
    match &record.value {
        Some(value) => {
            slot[FLAG_OFFSET] = 0;
            value.encode(&mut slot[VALUE_OFFSET..]);
        }
        None => {
            slot[FLAG_OFFSET] = FLAG_VALUE_NULL;
            V::null_sentinel().encode(&mut slot[VALUE_OFFSET..]);
        }
    }
}
