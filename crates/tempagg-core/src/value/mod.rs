//! Module: value
//! Responsibility: the primitive value family aggregated by time-ordered aggregators.
//! Does not own: slot offsets, flag bytes, or time encoding.
//! Boundary: per-type value-region codec and ordering consumed by aggregators and factories.

#[cfg(test)]
mod tests;

use crate::error::InternalError;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::{cmp::Ordering, fmt::Debug};

///
/// CONSTANTS
///

/// Default byte budget for string values held in one buffer slot.
pub const DEFAULT_MAX_STRING_BYTES: usize = 1024;

/// Largest accepted string byte budget (1 MiB per slot).
pub const MAX_STRING_BYTES: usize = 1024 * 1024;

/// Width of the length prefix in front of a string value region.
const STRING_LEN_BYTES: usize = size_of::<u32>();

///
/// ColumnType
///
/// Primitive column type reported to the surrounding planner.
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ColumnType {
    Double,
    Float,
    Long,
    String,
}

impl ColumnType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Double => "double",
            Self::Float => "float",
            Self::Long => "long",
            Self::String => "string",
        }
    }
}

impl std::fmt::Display for ColumnType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

///
/// ValueLimits
///
/// Size limits applied to variable-width values before they are stored.
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct ValueLimits {
    pub max_string_bytes: usize,
}

impl ValueLimits {
    #[must_use]
    pub const fn new(max_string_bytes: usize) -> Self {
        Self { max_string_bytes }
    }
}

impl Default for ValueLimits {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_STRING_BYTES)
    }
}

///
/// ScalarValue
///
/// One member of the aggregated value family.
/// Implementations own the byte layout of the value region inside a slot;
/// the region is always exactly `encoded_width` bytes long.
///

pub trait ScalarValue:
    Clone + Debug + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static
{
    const COLUMN_TYPE: ColumnType;

    /// Value written into the region of a slot whose value is null.
    fn null_sentinel() -> Self;

    /// Width in bytes of the value region.
    fn encoded_width(limits: ValueLimits) -> usize;

    /// Write this value into `dst`, which spans the whole value region.
    fn encode(&self, dst: &mut [u8]);

    /// Read a value back out of a value region.
    fn decode(src: &[u8]) -> Result<Self, InternalError>;

    /// Total order used when sorting finalized values.
    fn total_cmp(&self, other: &Self) -> Ordering;

    /// Read a value out of a materialized wire field.
    /// Numeric families accept any JSON number and convert it.
    fn from_json(value: &serde_json::Value) -> Option<Self>;

    /// Clamp a freshly read value to the configured limits.
    #[must_use]
    fn fit(self, _limits: ValueLimits) -> Self {
        self
    }
}

fn fixed<const N: usize>(src: &[u8]) -> Result<[u8; N], InternalError> {
    src.get(..N)
        .and_then(|bytes| <[u8; N]>::try_from(bytes).ok())
        .ok_or_else(|| {
            InternalError::aggregator_corruption(format!(
                "value region too short: expected {N} bytes, found {}",
                src.len()
            ))
        })
}

impl ScalarValue for i64 {
    const COLUMN_TYPE: ColumnType = ColumnType::Long;

    fn null_sentinel() -> Self {
        0
    }

    fn encoded_width(_limits: ValueLimits) -> usize {
        size_of::<Self>()
    }

    fn encode(&self, dst: &mut [u8]) {
        dst[..size_of::<Self>()].copy_from_slice(&self.to_be_bytes());
    }

    fn decode(src: &[u8]) -> Result<Self, InternalError> {
        fixed::<8>(src).map(Self::from_be_bytes)
    }

    fn total_cmp(&self, other: &Self) -> Ordering {
        self.cmp(other)
    }

    // Fractional numbers truncate toward zero and saturate at the bounds.
    #[expect(clippy::cast_possible_truncation)]
    fn from_json(value: &serde_json::Value) -> Option<Self> {
        value
            .as_i64()
            .or_else(|| value.as_f64().map(|number| number as Self))
    }
}

impl ScalarValue for f64 {
    const COLUMN_TYPE: ColumnType = ColumnType::Double;

    fn null_sentinel() -> Self {
        0.0
    }

    fn encoded_width(_limits: ValueLimits) -> usize {
        size_of::<Self>()
    }

    fn encode(&self, dst: &mut [u8]) {
        dst[..size_of::<Self>()].copy_from_slice(&self.to_bits().to_be_bytes());
    }

    fn decode(src: &[u8]) -> Result<Self, InternalError> {
        fixed::<8>(src).map(|bytes| Self::from_bits(u64::from_be_bytes(bytes)))
    }

    fn total_cmp(&self, other: &Self) -> Ordering {
        Self::total_cmp(self, other)
    }

    fn from_json(value: &serde_json::Value) -> Option<Self> {
        value.as_f64()
    }
}

impl ScalarValue for f32 {
    const COLUMN_TYPE: ColumnType = ColumnType::Float;

    fn null_sentinel() -> Self {
        0.0
    }

    fn encoded_width(_limits: ValueLimits) -> usize {
        size_of::<Self>()
    }

    fn encode(&self, dst: &mut [u8]) {
        dst[..size_of::<Self>()].copy_from_slice(&self.to_bits().to_be_bytes());
    }

    fn decode(src: &[u8]) -> Result<Self, InternalError> {
        fixed::<4>(src).map(|bytes| Self::from_bits(u32::from_be_bytes(bytes)))
    }

    fn total_cmp(&self, other: &Self) -> Ordering {
        Self::total_cmp(self, other)
    }

    #[expect(clippy::cast_possible_truncation)]
    fn from_json(value: &serde_json::Value) -> Option<Self> {
        value.as_f64().map(|number| number as Self)
    }
}

impl ScalarValue for String {
    const COLUMN_TYPE: ColumnType = ColumnType::String;

    fn null_sentinel() -> Self {
        Self::new()
    }

    fn encoded_width(limits: ValueLimits) -> usize {
        STRING_LEN_BYTES + limits.max_string_bytes
    }

    #[expect(clippy::cast_possible_truncation)]
    fn encode(&self, dst: &mut [u8]) {
        let budget = dst.len().saturating_sub(STRING_LEN_BYTES);
        let text = truncate_utf8(self, budget);

        dst[..STRING_LEN_BYTES].copy_from_slice(&(text.len() as u32).to_be_bytes());
        dst[STRING_LEN_BYTES..STRING_LEN_BYTES + text.len()].copy_from_slice(text.as_bytes());
    }

    fn decode(src: &[u8]) -> Result<Self, InternalError> {
        let len = u32::from_be_bytes(fixed::<4>(src)?) as usize;
        let bytes = src
            .get(STRING_LEN_BYTES..STRING_LEN_BYTES + len)
            .ok_or_else(|| {
                InternalError::aggregator_corruption(format!(
                    "string length {len} exceeds value region of {} bytes",
                    src.len()
                ))
            })?;

        std::str::from_utf8(bytes)
            .map(str::to_owned)
            .map_err(|err| InternalError::aggregator_corruption(err.to_string()))
    }

    fn total_cmp(&self, other: &Self) -> Ordering {
        self.cmp(other)
    }

    fn from_json(value: &serde_json::Value) -> Option<Self> {
        value.as_str().map(str::to_owned)
    }

    fn fit(mut self, limits: ValueLimits) -> Self {
        let keep = truncate_utf8(&self, limits.max_string_bytes).len();
        self.truncate(keep);
        self
    }
}

// Longest prefix of `text` that fits in `max` bytes without splitting a char.
fn truncate_utf8(text: &str, max: usize) -> &str {
    if text.len() <= max {
        return text;
    }

    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }

    &text[..end]
}
