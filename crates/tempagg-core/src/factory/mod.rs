//! Module: factory
//! Responsibility: declarative first/last-by-time aggregator descriptors.
//! Does not own: per-row folding or slot byte layout.
//! Boundary: the only place that binds selectors, defines `combine`, and
//! produces cache keys for one aggregate.

mod any;
mod cache_key;


pub use any::AnyAggregatorFactory;
pub use cache_key::{AggregatorFingerprint, CacheKeyBuilder, cache_type_id};

use crate::{
    aggregate::{AggregatorInput, BufferAggregator, RowAggregator, SlotLayout},
    direction::Direction,
    error::InternalError,
    obs::sink::{self, AggregatorShape, MetricsEvent},
    record::{self, TimedValue},
    selector::ColumnSelectorFactory,
    serialize,
    value::{ColumnType, MAX_STRING_BYTES, ScalarValue, ValueLimits},
};
use std::{
    cmp::Ordering,
    fmt,
    hash::{Hash, Hasher},
    marker::PhantomData,
};

///
/// CONSTANTS
///

/// Canonical event-time column used when no time column is configured.
pub const TIME_COLUMN_NAME: &str = "__time";

///
/// FactoryPhase
///
/// `Raw` factories read a time column and a value column.
/// `Combining` factories read intermediate records from an earlier phase.
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum FactoryPhase {
    Raw,
    Combining,
}

///
/// RollupCombiner
///
/// Uninhabited: time-ordered aggregates have no ingestion-time rollup
/// combiner, so `make_aggregate_combiner` can only fail.
///

#[derive(Debug)]
pub enum RollupCombiner {}

///
/// TimedAggregatorFactory
///
/// Immutable descriptor for one first/last-by-time aggregate over the value
/// family `V`. Produces row and buffer aggregators, the pure `combine`
/// reducer, the merge-phase factory, and the cache key.
///

pub struct TimedAggregatorFactory<V> {
    name: String,
    field_name: String,
    time_column: String,
    direction: Direction,
    phase: FactoryPhase,
    limits: ValueLimits,
    _marker: PhantomData<fn() -> V>,
}

impl<V: ScalarValue> TimedAggregatorFactory<V> {
    /// Build a raw-phase factory; `name` and `field_name` must be non-blank.
    pub fn try_new(
        direction: Direction,
        name: impl Into<String>,
        field_name: impl Into<String>,
        time_column: Option<String>,
    ) -> Result<Self, InternalError> {
        let name = required("name", name.into())?;
        let field_name = required("fieldName", field_name.into())?;
        let time_column = match time_column {
            Some(column) => required("timeColumn", column)?,
            None => TIME_COLUMN_NAME.to_string(),
        };

        Ok(Self {
            name,
            field_name,
            time_column,
            direction,
            phase: FactoryPhase::Raw,
            limits: ValueLimits::default(),
            _marker: PhantomData,
        })
    }

    /// Build a `first` (earliest time wins) factory.
    pub fn first(
        name: impl Into<String>,
        field_name: impl Into<String>,
        time_column: Option<String>,
    ) -> Result<Self, InternalError> {
        Self::try_new(Direction::Earliest, name, field_name, time_column)
    }

    /// Build a `last` (latest time wins) factory.
    pub fn last(
        name: impl Into<String>,
        field_name: impl Into<String>,
        time_column: Option<String>,
    ) -> Result<Self, InternalError> {
        Self::try_new(Direction::Latest, name, field_name, time_column)
    }

    /// Override the value limits (string byte budget).
    pub fn with_limits(self, limits: ValueLimits) -> Result<Self, InternalError> {
        if limits.max_string_bytes == 0 {
            return Err(InternalError::factory_construction(
                "maxStringBytes must be greater than zero",
            ));
        }
        if limits.max_string_bytes > MAX_STRING_BYTES {
            return Err(InternalError::factory_construction(format!(
                "maxStringBytes must be at most {MAX_STRING_BYTES}, found {}",
                limits.max_string_bytes
            )));
        }

        Ok(Self { limits, ..self })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn field_name(&self) -> &str {
        &self.field_name
    }

    #[must_use]
    pub fn time_column(&self) -> &str {
        &self.time_column
    }

    #[must_use]
    pub const fn direction(&self) -> Direction {
        self.direction
    }

    #[must_use]
    pub const fn phase(&self) -> FactoryPhase {
        self.phase
    }

    #[must_use]
    pub const fn limits(&self) -> ValueLimits {
        self.limits
    }

    /// Bind a row aggregator to the columns of one partition.
    /// A nil input column yields a stateless no-op aggregator.
    pub fn factorize(&self, columns: &dyn ColumnSelectorFactory<V>) -> RowAggregator<V> {
        let input = self.bind(columns, AggregatorShape::Row);

        RowAggregator::new(self.direction, input, self.limits)
    }

    /// Bind a buffer aggregator to the columns of one partition.
    pub fn factorize_buffered(&self, columns: &dyn ColumnSelectorFactory<V>) -> BufferAggregator<V> {
        let input = self.bind(columns, AggregatorShape::Buffer);

        BufferAggregator::new(self.direction, input, self.limits)
    }

    fn bind(
        &self,
        columns: &dyn ColumnSelectorFactory<V>,
        shape: AggregatorShape,
    ) -> AggregatorInput<V> {
        let input = match self.phase {
            FactoryPhase::Raw => AggregatorInput::raw(
                columns.make_time_selector(&self.time_column),
                columns.make_value_selector(&self.field_name),
            ),
            FactoryPhase::Combining => {
                AggregatorInput::combined(columns.make_record_selector(&self.field_name))
            }
        };

        sink::record(MetricsEvent::Factorized {
            shape,
            input: input.kind(),
        });

        input
    }

    /// Pure reducer over two possibly absent records; ties keep `lhs`.
    #[must_use]
    pub fn combine(
        &self,
        lhs: Option<TimedValue<V>>,
        rhs: Option<TimedValue<V>>,
    ) -> Option<TimedValue<V>> {
        record::combine_records(self.direction, lhs, rhs)
    }

    /// Order two records by value, nulls first.
    #[must_use]
    pub fn compare(&self, lhs: Option<&TimedValue<V>>, rhs: Option<&TimedValue<V>>) -> Ordering {
        record::compare_by_value(lhs, rhs)
    }

    /// Comparator handed to sorters of finalized intermediate records.
    #[must_use]
    pub fn value_comparator(
        &self,
    ) -> fn(Option<&TimedValue<V>>, Option<&TimedValue<V>>) -> Ordering {
        record::compare_by_value::<V>
    }

    /// Factory for the next merge phase: reads this factory's output column.
    #[must_use]
    pub fn combining_factory(&self) -> Self {
        Self {
            name: self.name.clone(),
            field_name: self.name.clone(),
            time_column: self.time_column.clone(),
            direction: self.direction,
            phase: FactoryPhase::Combining,
            limits: self.limits,
            _marker: PhantomData,
        }
    }

    /// Ingestion-time rollup is not supported for time-ordered aggregates.
    pub fn make_aggregate_combiner(&self) -> Result<RollupCombiner, InternalError> {
        Err(InternalError::factory_unsupported(format!(
            "{} is not supported during ingestion for rollup",
            self.type_name()
        )))
    }

    /// Decode a materialized `{lhs, rhs}` map.
    /// A missing or null `rhs` is a null value; a missing `lhs` is an error.
    pub fn deserialize(&self, value: &serde_json::Value) -> Result<TimedValue<V>, InternalError> {
        decode_record(value)
    }

    /// Encode a record as the materialized `{lhs, rhs}` map.
    pub fn serialize(&self, record: &TimedValue<V>) -> Result<serde_json::Value, InternalError> {
        serde_json::to_value(record)
            .map_err(|err| InternalError::serialize_corruption(err.to_string()))
    }

    /// Encode a possibly absent record for the result cache.
    pub fn to_cache_bytes(&self, record: Option<&TimedValue<V>>) -> Result<Vec<u8>, InternalError> {
        Ok(serialize::serialize(&record)?)
    }

    /// Decode bytes produced by [`Self::to_cache_bytes`].
    pub fn from_cache_bytes(&self, bytes: &[u8]) -> Result<Option<TimedValue<V>>, InternalError> {
        Ok(serialize::deserialize(bytes)?)
    }

    /// Project a record down to its value; time is discarded.
    #[must_use]
    pub fn finalize_computation(&self, record: Option<TimedValue<V>>) -> Option<V> {
        record.and_then(TimedValue::into_value)
    }

    /// Deterministic key over (type id, fieldName, timeColumn).
    /// String families also encode their byte budget.
    #[must_use]
    pub fn cache_key(&self) -> Vec<u8> {
        let builder = CacheKeyBuilder::new(self.cache_type_id())
            .append_str(&self.field_name)
            .append_str(&self.time_column);

        match V::COLUMN_TYPE {
            ColumnType::String => builder.append_usize(self.limits.max_string_bytes).build(),
            ColumnType::Double | ColumnType::Float | ColumnType::Long => builder.build(),
        }
    }

    #[must_use]
    pub fn fingerprint(&self) -> AggregatorFingerprint {
        AggregatorFingerprint::of_cache_key(&self.cache_key())
    }

    #[must_use]
    pub const fn cache_type_id(&self) -> u8 {
        cache_type_id(V::COLUMN_TYPE, self.direction)
    }

    /// Exact slot width written by buffer aggregators of this factory.
    #[must_use]
    pub fn max_intermediate_size(&self) -> usize {
        SlotLayout::for_value::<V>(self.limits).width()
    }

    /// Copy with a different output name; everything else is unchanged.
    pub fn with_name(&self, name: impl Into<String>) -> Result<Self, InternalError> {
        Ok(Self {
            name: required("name", name.into())?,
            field_name: self.field_name.clone(),
            time_column: self.time_column.clone(),
            direction: self.direction,
            phase: self.phase,
            limits: self.limits,
            _marker: PhantomData,
        })
    }

    /// Columns this aggregate reads.
    #[must_use]
    pub fn required_fields(&self) -> [&str; 2] {
        [self.time_column.as_str(), self.field_name.as_str()]
    }

    /// Declared intermediate type. Reported as the primitive value type so
    /// execution paths without complex-type support can still carry it.
    #[must_use]
    pub const fn intermediate_type(&self) -> ColumnType {
        V::COLUMN_TYPE
    }

    #[must_use]
    pub const fn result_type(&self) -> ColumnType {
        V::COLUMN_TYPE
    }

    /// e.g. `LongFirstAggregatorFactory`.
    #[must_use]
    pub fn type_name(&self) -> String {
        let family = match V::COLUMN_TYPE {
            ColumnType::Double => "Double",
            ColumnType::Float => "Float",
            ColumnType::Long => "Long",
            ColumnType::String => "String",
        };

        format!("{family}{}AggregatorFactory", self.direction.label())
    }
}

// Decode one `{lhs, rhs}` map without defaulting a missing time.
// Any JSON number is accepted for the time; fractional times truncate.
fn decode_record<V: ScalarValue>(value: &serde_json::Value) -> Result<TimedValue<V>, InternalError> {
    let map = value.as_object().ok_or_else(|| {
        InternalError::serialize_corruption(format!(
            "intermediate record must be a map, found {value}"
        ))
    })?;

    let time = match map.get("lhs") {
        Some(lhs) => i64::from_json(lhs).ok_or_else(|| {
            InternalError::serialize_corruption(format!(
                "intermediate record time 'lhs' must be a number, found {lhs}"
            ))
        })?,
        None => {
            return Err(InternalError::serialize_corruption(
                "intermediate record is missing its time field 'lhs'",
            ));
        }
    };

    let value = match map.get("rhs") {
        None | Some(serde_json::Value::Null) => None,
        Some(rhs) => Some(V::from_json(rhs).ok_or_else(|| {
            InternalError::serialize_corruption(format!(
                "intermediate record value 'rhs' is not a {} value: {rhs}",
                V::COLUMN_TYPE
            ))
        })?),
    };

    Ok(TimedValue::new(time, value))
}

fn required(field: &str, value: String) -> Result<String, InternalError> {
    if value.trim().is_empty() {
        return Err(InternalError::factory_construction(format!(
            "must have a valid, non-empty {field}"
        )));
    }

    Ok(value)
}

impl<V> Clone for TimedAggregatorFactory<V> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            field_name: self.field_name.clone(),
            time_column: self.time_column.clone(),
            direction: self.direction,
            phase: self.phase,
            limits: self.limits,
            _marker: PhantomData,
        }
    }
}

impl<V> PartialEq for TimedAggregatorFactory<V> {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.field_name == other.field_name
            && self.time_column == other.time_column
            && self.direction == other.direction
            && self.phase == other.phase
            && self.limits == other.limits
    }
}

impl<V> Eq for TimedAggregatorFactory<V> {}

impl<V> Hash for TimedAggregatorFactory<V> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.field_name.hash(state);
        self.time_column.hash(state);
        self.direction.hash(state);
        self.phase.hash(state);
        self.limits.hash(state);
    }
}

impl<V: ScalarValue> fmt::Debug for TimedAggregatorFactory<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimedAggregatorFactory")
            .field("type", &self.type_name())
            .field("name", &self.name)
            .field("field_name", &self.field_name)
            .field("time_column", &self.time_column)
            .field("phase", &self.phase)
            .field("limits", &self.limits)
            .finish()
    }
}

impl<V: ScalarValue> fmt::Display for TimedAggregatorFactory<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{{name='{}', fieldName='{}', timeColumn='{}'}}",
            self.type_name(),
            self.name,
            self.field_name,
            self.time_column
        )
    }
}
