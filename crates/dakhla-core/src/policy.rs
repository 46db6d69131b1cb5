//! Role/action permission decision table.
//!
//! This module is the single authoritative rule set for who may do what to a
//! record in a given status. It is pure and stateless: the current status is
//! passed in by the caller, which has already fetched the record. Route-level
//! checks must delegate here rather than re-encode the rules.

use crate::enums::{RecordStatus, Role, WorkflowAction};
use crate::errors::DomainError;

/// Exposes a record's workflow status for visibility filtering.
pub trait HasStatus {
    fn status(&self) -> RecordStatus;
}

/// Authorize `role` to perform `action` on a record currently in `current`.
///
/// # Errors
///
/// Returns [`DomainError::Forbidden`] with the required role (when there is
/// exactly one) and a human-readable reason.
pub fn authorize(role: Role, action: WorkflowAction, current: RecordStatus) -> Result<(), DomainError> {
    match action {
        WorkflowAction::Create => match role {
            Role::Admin => Ok(()),
            _ => Err(DomainError::requires_role(
                Role::Admin,
                "only admin can create records",
            )),
        },
        WorkflowAction::Edit => match role {
            Role::Admin if current.can_edit() => Ok(()),
            // Super alone may touch previously-accepted records.
            Role::Super if current == RecordStatus::Accepted => Ok(()),
            Role::Admin => Err(DomainError::Forbidden {
                reason: format!("records in status {current} cannot be edited"),
                required_role: (current == RecordStatus::Accepted).then_some(Role::Super),
            }),
            Role::Super => Err(DomainError::Forbidden {
                reason: format!(
                    "super may only edit accepted records, not {current} ones"
                ),
                required_role: current.can_edit().then_some(Role::Admin),
            }),
            Role::User => Err(DomainError::requires_role(
                Role::Admin,
                "only admin can edit records",
            )),
        },
        WorkflowAction::Delete => match role {
            Role::Admin if current.can_delete() => Ok(()),
            Role::Admin => Err(DomainError::Forbidden {
                reason: format!(
                    "records in status {current} cannot be deleted; only draft and rejected records can"
                ),
                required_role: None,
            }),
            _ => Err(DomainError::requires_role(
                Role::Admin,
                "only admin can delete records",
            )),
        },
        WorkflowAction::View => match role {
            Role::Admin | Role::Super => Ok(()),
            Role::User if current == RecordStatus::Accepted => Ok(()),
            Role::User => Err(DomainError::Forbidden {
                reason: "users can only view accepted records".to_string(),
                required_role: None,
            }),
        },
        WorkflowAction::SubmitForReview => match role {
            Role::Admin => Ok(()),
            _ => Err(DomainError::requires_role(
                Role::Admin,
                "only admin can submit records for review",
            )),
        },
        WorkflowAction::ApproveOrReject => match role {
            Role::Super => Ok(()),
            _ => Err(DomainError::requires_role(
                Role::Super,
                "only super can approve, reject, issue, or archive records",
            )),
        },
    }
}

/// Categorize a status transition as a [`WorkflowAction`] for authorization.
///
/// Review submission and resubmission belong to admin; everything after
/// review (approve, reject, issue, archive) belongs to super; cancelling a
/// still-editable record is an edit. A same-state request is treated as an
/// edit of the record.
#[must_use]
pub fn action_for_transition(from: RecordStatus, to: RecordStatus) -> WorkflowAction {
    use RecordStatus::{Accepted, InReview, Rejected};
    match (from, to) {
        (RecordStatus::Draft | Rejected, InReview) => WorkflowAction::SubmitForReview,
        (InReview, Accepted | Rejected)
        | (Accepted, RecordStatus::Issued | RecordStatus::Archived)
        | (RecordStatus::Issued, RecordStatus::Archived) => WorkflowAction::ApproveOrReject,
        _ => WorkflowAction::Edit,
    }
}

/// Apply the view rule to a collection: `user` keeps only accepted records,
/// `admin`/`super` keep everything.
#[must_use]
pub fn filter_visible<T: HasStatus>(records: Vec<T>, role: Role) -> Vec<T> {
    match role {
        Role::User => records
            .into_iter()
            .filter(|r| r.status() == RecordStatus::Accepted)
            .collect(),
        Role::Admin | Role::Super => records,
    }
}
