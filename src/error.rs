//! Error types for listing operations.

use std::fmt;
use thiserror::Error;

/// Result type alias for listing operations.
pub type Result<T> = std::result::Result<T, ListingError>;

/// Why a comparison mutation was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// The comparison set already holds its maximum number of cars.
    MaxSizeExceeded,
}

impl RejectReason {
    /// Stable machine-readable code for API consumers.
    pub fn code(&self) -> &'static str {
        match self {
            RejectReason::MaxSizeExceeded => "MaxSizeExceeded",
        }
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Errors surfaced by the listing controller and its catalog.
#[derive(Error, Debug)]
pub enum ListingError {
    /// A comparison add was refused; the set was left untouched.
    #[error("rejected: {0}")]
    Rejected(RejectReason),

    /// The comparison view needs at least two selected cars.
    #[error("insufficient selection: {selected} car(s) selected, at least 2 required")]
    InsufficientSelection {
        /// Number of cars currently selected.
        selected: usize,
    },

    /// The id does not name any car in the catalog.
    #[error("unknown car: {0}")]
    UnknownItem(String),

    /// A catalog file listed the same id twice.
    #[error("duplicate car id in catalog: {0}")]
    DuplicateItem(String),

    /// IO operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ListingError {
    /// Short machine-readable reason used in API error bodies.
    pub fn reason(&self) -> &'static str {
        match self {
            ListingError::Rejected(reason) => reason.code(),
            ListingError::InsufficientSelection { .. } => "InsufficientSelection",
            ListingError::UnknownItem(_) => "UnknownItem",
            ListingError::DuplicateItem(_) => "DuplicateItem",
            ListingError::Io(_) => "Io",
            ListingError::Json(_) => "Json",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reason_codes() {
        let err = ListingError::Rejected(RejectReason::MaxSizeExceeded);
        assert_eq!(err.reason(), "MaxSizeExceeded");
        assert_eq!(err.to_string(), "rejected: MaxSizeExceeded");

        let err = ListingError::InsufficientSelection { selected: 1 };
        assert_eq!(err.reason(), "InsufficientSelection");
        assert!(err.to_string().contains("1 car(s)"));
    }
}
