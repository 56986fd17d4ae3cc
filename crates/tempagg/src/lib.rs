//! ## Crate layout
//! - `core`: factories, row and buffer aggregators, slot arenas, config, and observability.
//!
//! The `prelude` module mirrors the surface used by query engines that
//! drive aggregation; configuration and telemetry live under `core`.

pub use tempagg_core as core;

/// re-exports
///
/// callers deriving configuration types next to `AggregatorSpec` can use
/// the same serde without naming it in their own Cargo.toml
pub mod __reexports {
    pub use serde;
}

//
// Consts
//

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//
// Errors
//

pub use crate::core::error::{ErrorClass, ErrorOrigin, InternalError as Error};

///
/// Engine Prelude
///

pub mod prelude {
    pub use crate::core::{
        config::{AggregationConfig, AggregatorKind, AggregatorSpec},
        prelude::*,
    };
}
