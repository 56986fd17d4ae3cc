use std::fmt;
use thiserror::Error as ThisError;

///
/// InternalError
///
/// Structured engine error with a stable internal classification.
/// Not a stable API; intended for internal use and may change without notice.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
#[error("{message}")]
pub struct InternalError {
    pub class: ErrorClass,
    pub origin: ErrorOrigin,
    pub message: String,
}

impl InternalError {
    /// Construct an InternalError from its classification and message.
    pub fn new(class: ErrorClass, origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self {
            class,
            origin,
            message: message.into(),
        }
    }

    /// Construct a factory-origin construction error.
    pub(crate) fn factory_construction(message: impl Into<String>) -> Self {
        Self::new(
            ErrorClass::Construction,
            ErrorOrigin::Factory,
            message.into(),
        )
    }

    /// Construct a factory-origin unsupported error.
    pub(crate) fn factory_unsupported(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Unsupported, ErrorOrigin::Factory, message.into())
    }

    /// Construct an aggregator-origin corruption error.
    pub(crate) fn aggregator_corruption(message: impl Into<String>) -> Self {
        Self::new(
            ErrorClass::Corruption,
            ErrorOrigin::Aggregator,
            message.into(),
        )
    }

    /// Construct an arena-origin internal error.
    pub(crate) fn arena_internal(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Internal, ErrorOrigin::Arena, message.into())
    }

    /// Construct a serialize-origin corruption error.
    pub(crate) fn serialize_corruption(message: impl Into<String>) -> Self {
        Self::new(
            ErrorClass::Corruption,
            ErrorOrigin::Serialize,
            message.into(),
        )
    }

    /// Construct a config-origin construction error.
    pub(crate) fn config_construction(message: impl Into<String>) -> Self {
        Self::new(
            ErrorClass::Construction,
            ErrorOrigin::Config,
            message.into(),
        )
    }

    #[must_use]
    pub const fn is_unsupported(&self) -> bool {
        matches!(self.class, ErrorClass::Unsupported)
    }

    #[must_use]
    pub fn display_with_class(&self) -> String {
        format!("{}:{}: {}", self.origin, self.class, self.message)
    }
}

///
/// ErrorClass
/// Internal error taxonomy for runtime classification.
/// Not a stable API; may change without notice.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorClass {
    Construction,
    Corruption,
    Internal,
    Unsupported,
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Construction => "construction",
            Self::Corruption => "corruption",
            Self::Internal => "internal",
            Self::Unsupported => "unsupported",
        };
        write!(f, "{label}")
    }
}

///
/// ErrorOrigin
/// Internal origin taxonomy for runtime classification.
/// Not a stable API; may change without notice.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorOrigin {
    Aggregator,
    Arena,
    Config,
    Factory,
    Serialize,
}

impl fmt::Display for ErrorOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Aggregator => "aggregator",
            Self::Arena => "arena",
            Self::Config => "config",
            Self::Factory => "factory",
            Self::Serialize => "serialize",
        };
        write!(f, "{label}")
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_with_class_prefixes_origin_and_class() {
        let err = InternalError::factory_unsupported("no rollup");

        assert_eq!(err.display_with_class(), "factory:unsupported: no rollup");
        assert!(err.is_unsupported());
    }

    #[test]
    fn construction_errors_are_not_unsupported() {
        let err = InternalError::factory_construction("name required");

        assert_eq!(err.class, ErrorClass::Construction);
        assert_eq!(err.origin, ErrorOrigin::Factory);
        assert!(!err.is_unsupported());
    }
}
