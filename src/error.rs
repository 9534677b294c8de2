//! Error types for the correlation layer
//!
//! Nothing in here is ever surfaced as a panic. Registration problems are
//! returned to the caller opening a dialog, handler problems are reported
//! through [`DismissOutcome`] and the log.

/// Errors raised by the pending-callback registry
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("Dialog id '{0}' is already pending")]
    DuplicateId(String),
}

/// Errors visible to the caller of `show_dialog`
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DialogError {
    #[error("Dialog id '{0}' is already pending")]
    DuplicateId(String),

    /// The pending callback was evicted without a response
    /// (explicit dismissal, expiry, or service teardown).
    #[error("Dialog '{0}' was dismissed without a response")]
    Abandoned(String),
}

impl From<RegistryError> for DialogError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::DuplicateId(id) => DialogError::DuplicateId(id),
        }
    }
}

/// Failure of an action handler while a dialog was being closed
#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    #[error("Handler for action '{action}' failed: {source}")]
    Failed {
        action: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Handler for action '{action}' panicked: {message}")]
    Panicked { action: String, message: String },
}

impl HandlerError {
    /// Action key whose handler failed
    pub fn action(&self) -> &str {
        match self {
            HandlerError::Failed { action, .. } | HandlerError::Panicked { action, .. } => action,
        }
    }
}

/// Result of dispatching a dismissal
#[derive(Debug)]
pub enum DismissOutcome {
    /// A pending callback was found, its handler ran and the caller was resolved
    Resolved,
    /// The handler failed but the caller was still resolved
    HandlerFailed(HandlerError),
    /// No callback was pending under that id
    Unregistered,
}

impl DismissOutcome {
    pub fn is_resolved(&self) -> bool {
        matches!(self, DismissOutcome::Resolved | DismissOutcome::HandlerFailed(_))
    }

    pub fn is_unregistered(&self) -> bool {
        matches!(self, DismissOutcome::Unregistered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_error_converts_to_dialog_error() {
        let err: DialogError = RegistryError::DuplicateId("abc".to_string()).into();
        assert_eq!(err, DialogError::DuplicateId("abc".to_string()));
        assert_eq!(err.to_string(), "Dialog id 'abc' is already pending");
    }

    #[test]
    fn test_outcome_helpers() {
        assert!(DismissOutcome::Resolved.is_resolved());
        assert!(DismissOutcome::Unregistered.is_unregistered());

        let failed = DismissOutcome::HandlerFailed(HandlerError::Panicked {
            action: "yes".to_string(),
            message: "boom".to_string(),
        });
        assert!(failed.is_resolved());
        assert!(!failed.is_unregistered());
    }
}
