//! Error types for port operations.

/// Failures reported by (or about) an external collaborator.
///
/// None of these are fatal to the day pipeline: conditions fail closed and
/// effects are skipped and logged.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CollaboratorError {
    /// The collaborator was never wired in.
    #[error("{0} is not available")]
    Unavailable(&'static str),

    /// The collaborator refused or failed the operation.
    #[error("{collaborator} rejected the request: {message}")]
    Rejected {
        collaborator: &'static str,
        message: String,
    },

    /// Shared state guarded by the collaborator is poisoned.
    #[error("{0} state lock is poisoned")]
    Poisoned(&'static str),
}

impl CollaboratorError {
    /// Create a Rejected error with collaborator context.
    pub fn rejected(collaborator: &'static str, message: impl ToString) -> Self {
        Self::Rejected {
            collaborator,
            message: message.to_string(),
        }
    }

    /// Check if this is an Unavailable error.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}
