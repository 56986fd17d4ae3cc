//! Module: record
//! Responsibility: the intermediate (time, value) record exchanged between phases.
//! Does not own: slot byte layout or selector binding.
//! Boundary: pure record algebra shared by row, buffer, and merge aggregation.

use crate::{direction::Direction, value::ScalarValue};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

///
/// TimedValue
///
/// One intermediate record. `time` is always a real row time; a missing
/// `value` means the winning row carried a null.
/// The absent record (no row aggregated) is `Option::<TimedValue<V>>::None`.
///
/// Serialized field names follow the materialized wire map: `lhs` is the
/// time and `rhs` the value.
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct TimedValue<V> {
    #[serde(rename = "lhs")]
    pub time: i64,

    #[serde(rename = "rhs")]
    pub value: Option<V>,
}

impl<V> TimedValue<V> {
    #[must_use]
    pub const fn new(time: i64, value: Option<V>) -> Self {
        Self { time, value }
    }

    #[must_use]
    pub const fn present(time: i64, value: V) -> Self {
        Self::new(time, Some(value))
    }

    #[must_use]
    pub const fn null_value(time: i64) -> Self {
        Self::new(time, None)
    }

    #[must_use]
    pub const fn is_value_null(&self) -> bool {
        self.value.is_none()
    }

    #[must_use]
    pub fn into_value(self) -> Option<V> {
        self.value
    }
}

/// Reduce two possibly absent records under `direction`.
///
/// Absence is the identity. When both are present the record with the
/// winning time is returned and ties keep `lhs`.
#[must_use]
pub fn combine_records<V>(
    direction: Direction,
    lhs: Option<TimedValue<V>>,
    rhs: Option<TimedValue<V>>,
) -> Option<TimedValue<V>> {
    match (lhs, rhs) {
        (None, rhs) => rhs,
        (lhs, None) => lhs,
        (Some(lhs), Some(rhs)) => {
            if direction.keeps_left(lhs.time, rhs.time) {
                Some(lhs)
            } else {
                Some(rhs)
            }
        }
    }
}

/// Order two records by value with nulls first.
///
/// The absent record sorts before a null value, which sorts before any
/// present value; present values use the family's total order.
#[must_use]
pub fn compare_by_value<V: ScalarValue>(
    lhs: Option<&TimedValue<V>>,
    rhs: Option<&TimedValue<V>>,
) -> Ordering {
    fn rank<V>(record: Option<&TimedValue<V>>) -> u8 {
        match record {
            None => 0,
            Some(TimedValue { value: None, .. }) => 1,
            Some(TimedValue { value: Some(_), .. }) => 2,
        }
    }

    match (
        lhs.and_then(|r| r.value.as_ref()),
        rhs.and_then(|r| r.value.as_ref()),
    ) {
        (Some(left), Some(right)) => left.total_cmp(right),
        _ => rank(lhs).cmp(&rank(rhs)),
    }
}

///
/// TESTS
///
