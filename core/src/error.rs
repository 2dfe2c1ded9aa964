//! Error types for list operations and persistence.

use crate::item::ItemId;
use thiserror::Error;

/// Errors produced by list operations and persistence backends
#[derive(Error, Debug)]
pub enum TodoError {
    /// The operation referenced an ID that is not in the list
    ///
    /// Always recoverable; the list is left unchanged.
    #[error("item with id {0} not found")]
    NotFound(ItemId),

    /// The persistence backend could not read or write its storage
    ///
    /// The in-memory list is still valid, it just was not persisted.
    #[error("could not access {location}: {source}")]
    Io {
        /// Where the backend stores the list (usually a file path)
        location: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Stored content could not be parsed as a list of items
    #[error("could not decode {location}: {source}")]
    Decode {
        /// Where the unreadable content came from
        location: String,
        /// Underlying JSON error
        #[source]
        source: serde_json::Error,
    },

    /// The list could not be serialized
    #[error("could not encode list: {0}")]
    Encode(#[source] serde_json::Error),

    /// Every ID up to `u64::MAX` has been issued
    ///
    /// Only reachable when a loaded list already holds the largest ID.
    #[error("no item ids left after {0}")]
    IdsExhausted(ItemId),

    /// A payload failed boundary validation
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl TodoError {
    /// Builds an [`TodoError::Io`] for the given location
    #[must_use]
    pub fn io(location: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            location: location.into(),
            source,
        }
    }

    /// Builds a [`TodoError::Decode`] for the given location
    #[must_use]
    pub fn decode(location: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Decode {
            location: location.into(),
            source,
        }
    }

    /// Returns true for [`TodoError::NotFound`]
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Validation failures for item payloads
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Name was empty or whitespace
    #[error("name cannot be empty")]
    EmptyName,

    /// Due date was not `DD-MM-YYYY`
    #[error("due date {0:?} must be in DD-MM-YYYY format")]
    InvalidDue(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_message() {
        let err = TodoError::NotFound(ItemId::new(9));
        assert_eq!(err.to_string(), "item with id 9 not found");
        assert!(err.is_not_found());
    }

    #[test]
    fn io_error_carries_location() {
        let err = TodoError::io(
            "todos.json",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(err.to_string().contains("todos.json"));
        assert!(!err.is_not_found());
    }

    #[test]
    fn exhausted_ids_name_the_last_one() {
        let err = TodoError::IdsExhausted(ItemId::new(u64::MAX));
        assert_eq!(
            err.to_string(),
            format!("no item ids left after {}", u64::MAX)
        );
    }

    #[test]
    fn validation_is_transparent() {
        let err = TodoError::from(ValidationError::EmptyName);
        assert_eq!(err.to_string(), "name cannot be empty");
    }
}
