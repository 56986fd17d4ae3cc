//! Module: aggregate
//! Responsibility: row and buffer aggregators for first/last-by-time folding.
//! Does not own: factory configuration, cache keys, or wire decoding.
//! Boundary: aggregator instances are produced by `factory` and driven by callers.

mod buffer;
mod grouped;
mod input;
mod row;


pub use buffer::{BufferAggregator, SlotLayout};
pub use grouped::GroupedSlots;
pub use input::{AggregatorInput, InputKind};
pub use row::RowAggregator;
