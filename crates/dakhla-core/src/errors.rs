//! Cross-cutting error kinds for Dakhla.
//!
//! Every error surfaced to a caller carries a stable machine-readable tag via
//! [`DomainError::kind`] so callers branch on the kind, never on message text.
//! Storage-layer faults are wrapped into [`DomainError::Storage`] by the db
//! crate; audit-write failures never become a `DomainError` at all (they are
//! logged and swallowed inside the audit recorder).

use thiserror::Error;

use crate::enums::{RecordKind, RecordStatus, Role};

/// A field-level validation message.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    #[must_use]
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Errors surfaced by the workflow and repository layers.
#[derive(Debug, Error)]
pub enum DomainError {
    /// Record lookup returned no visible result.
    #[error("{entity} {id} not found")]
    NotFound { entity: RecordKind, id: String },

    /// The actor's role does not permit the action in the record's state.
    #[error("forbidden: {reason}")]
    Forbidden {
        reason: String,
        /// The role that would be allowed to perform the action, when there
        /// is exactly one.
        required_role: Option<Role>,
    },

    /// A state machine transition was attempted that is not allowed.
    #[error("cannot transition from {from} to {to}; allowed: {}", format_allowed(allowed))]
    InvalidTransition {
        from: RecordStatus,
        to: RecordStatus,
        allowed: Vec<RecordStatus>,
    },

    /// An identifier value already exists on another record.
    #[error("duplicate identifier: {}", fields.join(", "))]
    DuplicateIdentifier { fields: Vec<String> },

    /// Payload failed validation.
    #[error("validation failed: {}", errors.iter().map(|e| format!("{}: {}", e.field, e.message)).collect::<Vec<_>>().join("; "))]
    Validation { errors: Vec<FieldError> },

    /// The record store is unreachable or failed; the operation cannot proceed.
    #[error("storage unavailable: {0}")]
    Storage(#[source] anyhow::Error),
}

fn format_allowed(allowed: &[RecordStatus]) -> String {
    if allowed.is_empty() {
        "none (final state)".to_string()
    } else {
        allowed
            .iter()
            .map(|s| s.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl DomainError {
    /// Stable machine-readable tag for this error kind.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "not_found",
            Self::Forbidden { .. } => "forbidden",
            Self::InvalidTransition { .. } => "invalid_transition",
            Self::DuplicateIdentifier { .. } => "duplicate_identifier",
            Self::Validation { .. } => "validation",
            Self::Storage(_) => "storage_unavailable",
        }
    }

    /// Shorthand for a single-field validation failure.
    #[must_use]
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            errors: vec![FieldError::new(field, message)],
        }
    }

    /// Shorthand for a forbidden action requiring a specific role.
    #[must_use]
    pub fn requires_role(role: Role, reason: impl Into<String>) -> Self {
        Self::Forbidden {
            reason: reason.into(),
            required_role: Some(role),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_are_stable() {
        let not_found = DomainError::NotFound {
            entity: RecordKind::Student,
            id: "stu-1".into(),
        };
        assert_eq!(not_found.kind(), "not_found");

        let dup = DomainError::DuplicateIdentifier {
            fields: vec!["uid_aadhar_no".into()],
        };
        assert_eq!(dup.kind(), "duplicate_identifier");

        let storage = DomainError::Storage(anyhow::anyhow!("connection refused"));
        assert_eq!(storage.kind(), "storage_unavailable");
    }

    #[test]
    fn invalid_transition_message_lists_alternatives() {
        let err = DomainError::InvalidTransition {
            from: RecordStatus::Accepted,
            to: RecordStatus::Draft,
            allowed: RecordStatus::Accepted.allowed_next_states().to_vec(),
        };
        let msg = err.to_string();
        assert!(msg.contains("accepted"), "{msg}");
        assert!(msg.contains("issued, archived"), "{msg}");
    }

    #[test]
    fn terminal_transition_message_says_final() {
        let err = DomainError::InvalidTransition {
            from: RecordStatus::Archived,
            to: RecordStatus::Draft,
            allowed: vec![],
        };
        assert!(err.to_string().contains("none (final state)"));
    }

    #[test]
    fn forbidden_names_required_role() {
        let err = DomainError::requires_role(Role::Super, "only super can approve or reject");
        match err {
            DomainError::Forbidden { required_role, .. } => {
                assert_eq!(required_role, Some(Role::Super));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }
}
