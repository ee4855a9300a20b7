//! Error types for trigger handling.
//!
//! [`TriggerError`] covers the conditions that fail a trigger request outright.
//! Ineligible jobs are not errors: they are reported as a
//! [`crate::Rejection`] inside a [`crate::TriggerOutcome`]. Per-parameter
//! resolution problems are not errors either; they become
//! [`crate::Diagnostic`] records and never abort a request.

use thiserror::Error;

/// Errors that fail a single trigger request or the whole process.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TriggerError {
    /// The payload is missing a required field, or a field has the wrong shape.
    ///
    /// Detected before any interaction with the execution host; nothing is
    /// queued when this is returned.
    #[error("Malformed payload: {reason}")]
    MalformedPayload {
        /// Description of the offending field.
        reason: String,
    },

    /// The execution host cannot accept work.
    ///
    /// This indicates a broken deployment, not a bad request. Callers must treat
    /// it as fatal rather than as a per-request response.
    #[error("Execution host unavailable: {message}")]
    HostUnavailable {
        /// Description of the host failure.
        message: String,
    },
}

impl TriggerError {
    /// Shorthand for a [`TriggerError::MalformedPayload`].
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedPayload {
            reason: reason.into(),
        }
    }

    /// Returns `true` if the error must bring the process down.
    pub fn is_unrecoverable(&self) -> bool {
        matches!(self, Self::HostUnavailable { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_host_failures_are_unrecoverable() {
        assert!(!TriggerError::malformed("missing 'by'").is_unrecoverable());
        assert!(TriggerError::HostUnavailable {
            message: "queue closed".into()
        }
        .is_unrecoverable());
    }

    #[test]
    fn malformed_message_names_the_reason() {
        let err = TriggerError::malformed("field 'by' is required");
        assert_eq!(err.to_string(), "Malformed payload: field 'by' is required");
    }
}
