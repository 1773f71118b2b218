//! Unified error types for the domain layer
//!
//! Provides a common error type that can be used across all domain operations,
//! enabling consistent error handling without forcing callers to use String or anyhow.

use thiserror::Error;

/// Unified error type for domain operations
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    /// Validation failed (e.g., invalid field values)
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Entity not found
    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// State transition not allowed
    #[error("Invalid state transition: {0}")]
    InvalidStateTransition(String),

    /// Authored content is malformed and cannot be evaluated
    #[error("Authoring error in event '{event_id}': {reason}")]
    Authoring { event_id: String, reason: String },
}

impl DomainError {
    /// Creates a validation error for business rule violations.
    ///
    /// Use this when a value is outside its allowed range or a required
    /// field is missing.
    ///
    /// # Example
    /// ```ignore
    /// if amount == 0 {
    ///     return Err(DomainError::validation("amount must be positive"));
    /// }
    /// ```
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a not found error
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Create an invalid state transition error
    pub fn invalid_state_transition(msg: impl Into<String>) -> Self {
        Self::InvalidStateTransition(msg.into())
    }

    /// Create an authoring error for a malformed event definition
    pub fn authoring(event_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Authoring {
            event_id: event_id.into(),
            reason: reason.into(),
        }
    }

    /// Check if this is an authoring error.
    pub fn is_authoring(&self) -> bool {
        matches!(self, Self::Authoring { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error() {
        let err = DomainError::validation("amount must be positive");
        assert!(matches!(err, DomainError::Validation(_)));
        assert_eq!(err.to_string(), "Validation failed: amount must be positive");
    }

    #[test]
    fn test_not_found_error() {
        let err = DomainError::not_found("EventDefinition", "radio_signal");
        assert!(matches!(err, DomainError::NotFound { .. }));
        assert!(err.to_string().contains("EventDefinition"));
        assert!(err.to_string().contains("radio_signal"));
    }

    #[test]
    fn test_authoring_error() {
        let err = DomainError::authoring("storm", "minDay 5 is after maxDay 3");
        assert!(err.is_authoring());
        assert_eq!(
            err.to_string(),
            "Authoring error in event 'storm': minDay 5 is after maxDay 3"
        );
    }
}
