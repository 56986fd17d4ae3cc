//! Module: config
//! Responsibility: declarative aggregator specs loaded from TOML or JSON.
//! Does not own: factory semantics or validation beyond required fields.
//! Boundary: turns user-facing configuration into typed factories.

#[cfg(test)]
mod tests;

use crate::{
    direction::Direction,
    error::InternalError,
    factory::AnyAggregatorFactory,
    value::ColumnType,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

///
/// AggregatorKind
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum AggregatorKind {
    DoubleFirst,
    DoubleLast,
    FloatFirst,
    FloatLast,
    LongFirst,
    LongLast,
    StringFirst,
    StringLast,
}

impl AggregatorKind {
    #[must_use]
    pub const fn column_type(self) -> ColumnType {
        match self {
            Self::DoubleFirst | Self::DoubleLast => ColumnType::Double,
            Self::FloatFirst | Self::FloatLast => ColumnType::Float,
            Self::LongFirst | Self::LongLast => ColumnType::Long,
            Self::StringFirst | Self::StringLast => ColumnType::String,
        }
    }

    #[must_use]
    pub const fn direction(self) -> Direction {
        match self {
            Self::DoubleFirst | Self::FloatFirst | Self::LongFirst | Self::StringFirst => {
                Direction::Earliest
            }
            Self::DoubleLast | Self::FloatLast | Self::LongLast | Self::StringLast => {
                Direction::Latest
            }
        }
    }
}

///
/// AggregatorSpec
///
/// One aggregator as written in configuration. `name` and `fieldName` are
/// optional here only so their absence can be reported as a construction
/// error instead of a parse error.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct AggregatorSpec {
    #[serde(rename = "type")]
    pub kind: AggregatorKind,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub field_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_column: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_string_bytes: Option<usize>,
}

impl AggregatorSpec {
    #[must_use]
    pub fn new(kind: AggregatorKind, name: &str, field_name: &str) -> Self {
        Self {
            kind,
            name: Some(name.to_string()),
            field_name: Some(field_name.to_string()),
            time_column: None,
            max_string_bytes: None,
        }
    }

    /// Parse one spec from its JSON form.
    pub fn from_json_str(json: &str) -> Result<Self, InternalError> {
        serde_json::from_str(json)
            .map_err(|err| InternalError::config_construction(format!("invalid aggregator spec: {err}")))
    }

    /// Validate and build the typed factory.
    pub fn build(&self) -> Result<AnyAggregatorFactory, InternalError> {
        AnyAggregatorFactory::try_from(self)
    }
}

///
/// AggregationConfig
///
/// A list of aggregator specs; output names must be unique.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AggregationConfig {
    #[serde(default)]
    pub aggregators: Vec<AggregatorSpec>,
}

impl AggregationConfig {
    pub fn from_toml_str(source: &str) -> Result<Self, InternalError> {
        toml::from_str(source)
            .map_err(|err| InternalError::config_construction(format!("invalid TOML config: {err}")))
    }

    pub fn from_json_str(source: &str) -> Result<Self, InternalError> {
        serde_json::from_str(source)
            .map_err(|err| InternalError::config_construction(format!("invalid JSON config: {err}")))
    }

    /// Build every factory, failing on the first invalid spec or on a
    /// duplicate output name.
    pub fn build_factories(&self) -> Result<Vec<AnyAggregatorFactory>, InternalError> {
        let mut names = BTreeSet::new();
        let mut factories = Vec::with_capacity(self.aggregators.len());

        for (index, spec) in self.aggregators.iter().enumerate() {
            let factory = spec.build().map_err(|err| {
                InternalError::config_construction(format!("aggregator[{index}]: {err}"))
            })?;
            if !names.insert(factory.name().to_string()) {
                return Err(InternalError::config_construction(format!(
                    "aggregator[{index}]: duplicate output name '{}'",
                    factory.name()
                )));
            }
            factories.push(factory);
        }

        Ok(factories)
    }
}
