use crate::{
    config::AggregatorSpec,
    error::InternalError,
    factory::{AggregatorFingerprint, TimedAggregatorFactory},
    value::{ColumnType, ValueLimits},
};
use std::fmt;

///
/// AnyAggregatorFactory
///
/// Type-erased factory built from configuration. Typed work (factorize,
/// combine, decode) happens on the wrapped `TimedAggregatorFactory`.
///

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum AnyAggregatorFactory {
    Double(TimedAggregatorFactory<f64>),
    Float(TimedAggregatorFactory<f32>),
    Long(TimedAggregatorFactory<i64>),
    String(TimedAggregatorFactory<String>),
}

macro_rules! with_factory {
    ($self:expr, $factory:ident => $body:expr) => {
        match $self {
            AnyAggregatorFactory::Double($factory) => $body,
            AnyAggregatorFactory::Float($factory) => $body,
            AnyAggregatorFactory::Long($factory) => $body,
            AnyAggregatorFactory::String($factory) => $body,
        }
    };
}

macro_rules! map_factory {
    ($self:expr, $factory:ident => $body:expr) => {
        match $self {
            AnyAggregatorFactory::Double($factory) => AnyAggregatorFactory::Double($body),
            AnyAggregatorFactory::Float($factory) => AnyAggregatorFactory::Float($body),
            AnyAggregatorFactory::Long($factory) => AnyAggregatorFactory::Long($body),
            AnyAggregatorFactory::String($factory) => AnyAggregatorFactory::String($body),
        }
    };
}

impl AnyAggregatorFactory {
    #[must_use]
    pub fn name(&self) -> &str {
        with_factory!(self, f => f.name())
    }

    #[must_use]
    pub fn field_name(&self) -> &str {
        with_factory!(self, f => f.field_name())
    }

    #[must_use]
    pub fn time_column(&self) -> &str {
        with_factory!(self, f => f.time_column())
    }

    #[must_use]
    pub fn cache_key(&self) -> Vec<u8> {
        with_factory!(self, f => f.cache_key())
    }

    #[must_use]
    pub fn fingerprint(&self) -> AggregatorFingerprint {
        with_factory!(self, f => f.fingerprint())
    }

    #[must_use]
    pub fn max_intermediate_size(&self) -> usize {
        with_factory!(self, f => f.max_intermediate_size())
    }

    #[must_use]
    pub fn intermediate_type(&self) -> ColumnType {
        with_factory!(self, f => f.intermediate_type())
    }

    #[must_use]
    pub fn result_type(&self) -> ColumnType {
        with_factory!(self, f => f.result_type())
    }

    #[must_use]
    pub fn required_fields(&self) -> [&str; 2] {
        with_factory!(self, f => f.required_fields())
    }

    #[must_use]
    pub fn combining_factory(&self) -> Self {
        map_factory!(self, f => f.combining_factory())
    }

    pub fn with_name(&self, name: &str) -> Result<Self, InternalError> {
        Ok(map_factory!(self, f => f.with_name(name)?))
    }
}

impl fmt::Display for AnyAggregatorFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        with_factory!(self, inner => fmt::Display::fmt(inner, f))
    }
}

impl TryFrom<&AggregatorSpec> for AnyAggregatorFactory {
    type Error = InternalError;

    fn try_from(spec: &AggregatorSpec) -> Result<Self, Self::Error> {
        let name = spec.name.clone().unwrap_or_default();
        let field_name = spec.field_name.clone().unwrap_or_default();
        let time_column = spec.time_column.clone();
        let direction = spec.kind.direction();

        let limits = match (spec.kind.column_type(), spec.max_string_bytes) {
            (ColumnType::String, Some(max)) => ValueLimits::new(max),
            (_, None) => ValueLimits::default(),
            (column, Some(_)) => {
                return Err(InternalError::factory_construction(format!(
                    "maxStringBytes does not apply to {column} aggregators"
                )));
            }
        };

        let factory = match spec.kind.column_type() {
            ColumnType::Double => Self::Double(
                TimedAggregatorFactory::try_new(direction, name, field_name, time_column)?
                    .with_limits(limits)?,
            ),
            ColumnType::Float => Self::Float(
                TimedAggregatorFactory::try_new(direction, name, field_name, time_column)?
                    .with_limits(limits)?,
            ),
            ColumnType::Long => Self::Long(
                TimedAggregatorFactory::try_new(direction, name, field_name, time_column)?
                    .with_limits(limits)?,
            ),
            ColumnType::String => Self::String(
                TimedAggregatorFactory::try_new(direction, name, field_name, time_column)?
                    .with_limits(limits)?,
            ),
        };

        Ok(factory)
    }
}
