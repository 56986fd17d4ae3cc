use serde::{Deserialize, Serialize};

///
/// Direction
///
/// Which end of the time axis an aggregator keeps: `Earliest` backs the
/// `first` aggregators and `Latest` backs the `last` aggregators.
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum Direction {
    #[default]
    Earliest,
    Latest,
}

impl Direction {
    /// True when `candidate` strictly beats `current`; equal times never win.
    #[must_use]
    pub const fn supersedes(self, candidate: i64, current: i64) -> bool {
        match self {
            Self::Earliest => candidate < current,
            Self::Latest => candidate > current,
        }
    }

    /// True when a combine of `(lhs, rhs)` keeps the left operand.
    /// Ties stay on the left.
    #[must_use]
    pub const fn keeps_left(self, lhs: i64, rhs: i64) -> bool {
        match self {
            Self::Earliest => lhs <= rhs,
            Self::Latest => lhs >= rhs,
        }
    }

    /// Time written into a freshly initialized slot.
    #[must_use]
    pub const fn initial_time(self) -> i64 {
        match self {
            Self::Earliest => i64::MAX,
            Self::Latest => i64::MIN,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Earliest => "First",
            Self::Latest => "Last",
        }
    }
}

///
/// TESTS
///
