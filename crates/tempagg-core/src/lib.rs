//! Core engine for tempagg: first/last-by-time aggregation across row
//! aggregators, buffer-packed slots, and multi-level merge phases.
#![warn(unreachable_pub)]

// public exports are one module level down
pub mod aggregate;
pub mod arena;
pub mod config;
pub mod direction;
pub mod error;
pub mod factory;
pub mod obs;
pub mod record;
pub mod selector;
pub mod serialize;
pub mod value;

// test
#[cfg(test)]
pub(crate) mod test_support;

///
/// Prelude
///
/// Prelude contains only domain vocabulary.
/// No errors, sinks, serializers, or helpers are re-exported here.
///

pub mod prelude {
    pub use crate::{
        aggregate::{BufferAggregator, GroupedSlots, RowAggregator},
        arena::{SlotArena, SlotOffset},
        direction::Direction,
        factory::{AnyAggregatorFactory, TimedAggregatorFactory},
        record::TimedValue,
        selector::{ColumnSelectorFactory, Selector},
        value::{ColumnType, ScalarValue},
    };
}
