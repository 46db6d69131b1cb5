//! Status, role, action, and entity-kind enums for Dakhla.
//!
//! All enums use `snake_case` serialization via `#[serde(rename_all = "snake_case")]`.
//! `RecordStatus` carries the certificate workflow state machine and provides
//! `allowed_next_states()` to enforce valid transitions at the application layer.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::DomainError;

// ---------------------------------------------------------------------------
// RecordStatus
// ---------------------------------------------------------------------------

/// Workflow status shared by every record kind (school, student, certificate).
///
/// ```text
/// draft → in_review → accepted → issued → archived
///       ↘ cancelled ↗ rejected ↘ archived
///                    ↖ in_review (resubmit)
/// ```
///
/// `archived` and `cancelled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum RecordStatus {
    Draft,
    InReview,
    Rejected,
    Accepted,
    Issued,
    Archived,
    Cancelled,
}

impl RecordStatus {
    /// Every status, in workflow order. Used for introspection and tests.
    pub const ALL: [Self; 7] = [
        Self::Draft,
        Self::InReview,
        Self::Rejected,
        Self::Accepted,
        Self::Issued,
        Self::Archived,
        Self::Cancelled,
    ];

    /// Valid next states from the current state.
    #[must_use]
    pub const fn allowed_next_states(self) -> &'static [Self] {
        match self {
            Self::Draft => &[Self::InReview, Self::Cancelled],
            Self::InReview => &[Self::Rejected, Self::Accepted, Self::Cancelled],
            Self::Rejected => &[Self::InReview, Self::Cancelled],
            Self::Accepted => &[Self::Issued, Self::Archived],
            Self::Issued => &[Self::Archived],
            Self::Archived | Self::Cancelled => &[],
        }
    }

    /// Check whether transitioning to `next` is allowed.
    ///
    /// Same-state is always allowed (no-op).
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        self == next || self.allowed_next_states().contains(&next)
    }

    /// Validate a transition, returning the attempted pair and the legal
    /// destinations on failure.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidTransition`] when `next` is not reachable
    /// from `self`.
    pub fn validate_transition(self, next: Self) -> Result<(), DomainError> {
        if self.can_transition_to(next) {
            Ok(())
        } else {
            Err(DomainError::InvalidTransition {
                from: self,
                to: next,
                allowed: self.allowed_next_states().to_vec(),
            })
        }
    }

    /// Whether this status has no further legal transitions.
    #[must_use]
    pub const fn is_final(self) -> bool {
        matches!(self, Self::Archived | Self::Cancelled)
    }

    /// Whether record fields may still be edited in this status.
    #[must_use]
    pub const fn can_edit(self) -> bool {
        matches!(self, Self::Draft | Self::InReview | Self::Rejected)
    }

    /// Whether a record in this status may be deleted.
    ///
    /// Stricter than [`can_edit`](Self::can_edit): records under review are
    /// kept until the review concludes.
    #[must_use]
    pub const fn can_delete(self) -> bool {
        matches!(self, Self::Draft | Self::Rejected)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::InReview => "in_review",
            Self::Rejected => "rejected",
            Self::Accepted => "accepted",
            Self::Issued => "issued",
            Self::Archived => "archived",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Role
// ---------------------------------------------------------------------------

/// Caller role, resolved once per request from the authenticated actor.
///
/// - `user`: read-only, sees accepted records only
/// - `admin`: authors records, submits them for review
/// - `super`: reviews, and controls the post-review lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Admin,
    Super,
}

impl Role {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
            Self::Super => "super",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// WorkflowAction
// ---------------------------------------------------------------------------

/// Action categories gated by the permission decision table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowAction {
    Create,
    Edit,
    Delete,
    View,
    SubmitForReview,
    ApproveOrReject,
}

impl WorkflowAction {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Edit => "edit",
            Self::Delete => "delete",
            Self::View => "view",
            Self::SubmitForReview => "submit_for_review",
            Self::ApproveOrReject => "approve_or_reject",
        }
    }
}

impl fmt::Display for WorkflowAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// AuditAction
// ---------------------------------------------------------------------------

/// Kind of action recorded in the audit log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    Insert,
    Update,
    Delete,
    View,
    Login,
    Logout,
}

impl AuditAction {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Insert => "insert",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::View => "view",
            Self::Login => "login",
            Self::Logout => "logout",
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// RecordKind
// ---------------------------------------------------------------------------

/// Kind of record in the register, used in audit and history rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    School,
    Student,
    Certificate,
    User,
}

impl RecordKind {
    /// The SQL table backing this record kind.
    #[must_use]
    pub const fn table_name(self) -> &'static str {
        match self {
            Self::School => "schools",
            Self::Student => "students",
            Self::Certificate => "certificates",
            Self::User => "users",
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::School => "school",
            Self::Student => "student",
            Self::Certificate => "certificate",
            Self::User => "user",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    // --- Serde roundtrip tests ---

    macro_rules! test_serde_roundtrip {
        ($name:ident, $ty:ty, $variant:expr, $expected_str:expr) => {
            #[test]
            fn $name() {
                let val = $variant;
                let json = serde_json::to_string(&val).unwrap();
                assert_eq!(json, format!("\"{}\"", $expected_str));
                let recovered: $ty = serde_json::from_str(&json).unwrap();
                assert_eq!(recovered, val);
            }
        };
    }

    test_serde_roundtrip!(
        status_in_review,
        RecordStatus,
        RecordStatus::InReview,
        "in_review"
    );
    test_serde_roundtrip!(status_draft, RecordStatus, RecordStatus::Draft, "draft");
    test_serde_roundtrip!(
        status_cancelled,
        RecordStatus,
        RecordStatus::Cancelled,
        "cancelled"
    );

    test_serde_roundtrip!(role_super, Role, Role::Super, "super");
    test_serde_roundtrip!(role_user, Role, Role::User, "user");

    test_serde_roundtrip!(
        action_submit,
        WorkflowAction,
        WorkflowAction::SubmitForReview,
        "submit_for_review"
    );
    test_serde_roundtrip!(
        action_approve,
        WorkflowAction,
        WorkflowAction::ApproveOrReject,
        "approve_or_reject"
    );

    test_serde_roundtrip!(audit_insert, AuditAction, AuditAction::Insert, "insert");
    test_serde_roundtrip!(audit_logout, AuditAction, AuditAction::Logout, "logout");

    test_serde_roundtrip!(
        kind_certificate,
        RecordKind,
        RecordKind::Certificate,
        "certificate"
    );

    // --- Transition matrix ---

    #[rstest]
    #[case(RecordStatus::Draft, RecordStatus::InReview)]
    #[case(RecordStatus::Draft, RecordStatus::Cancelled)]
    #[case(RecordStatus::InReview, RecordStatus::Rejected)]
    #[case(RecordStatus::InReview, RecordStatus::Accepted)]
    #[case(RecordStatus::InReview, RecordStatus::Cancelled)]
    #[case(RecordStatus::Rejected, RecordStatus::InReview)]
    #[case(RecordStatus::Rejected, RecordStatus::Cancelled)]
    #[case(RecordStatus::Accepted, RecordStatus::Issued)]
    #[case(RecordStatus::Accepted, RecordStatus::Archived)]
    #[case(RecordStatus::Issued, RecordStatus::Archived)]
    fn legal_edges(#[case] from: RecordStatus, #[case] to: RecordStatus) {
        assert!(from.can_transition_to(to));
        assert!(from.validate_transition(to).is_ok());
    }

    #[test]
    fn every_edge_not_in_adjacency_list_is_rejected() {
        for from in RecordStatus::ALL {
            for to in RecordStatus::ALL {
                let legal = from == to || from.allowed_next_states().contains(&to);
                assert_eq!(
                    from.can_transition_to(to),
                    legal,
                    "{from} -> {to} disagreement"
                );
                if !legal {
                    let err = from.validate_transition(to).unwrap_err();
                    match err {
                        DomainError::InvalidTransition { allowed, .. } => {
                            assert_eq!(allowed, from.allowed_next_states().to_vec());
                        }
                        other => panic!("expected InvalidTransition, got {other:?}"),
                    }
                }
            }
        }
    }

    #[test]
    fn same_state_is_noop_success() {
        for status in RecordStatus::ALL {
            assert!(status.can_transition_to(status));
            assert!(status.validate_transition(status).is_ok());
        }
    }

    #[test]
    fn terminal_states_have_no_exits() {
        assert!(RecordStatus::Archived.allowed_next_states().is_empty());
        assert!(RecordStatus::Cancelled.allowed_next_states().is_empty());
        assert!(RecordStatus::Archived.is_final());
        assert!(RecordStatus::Cancelled.is_final());
        assert!(!RecordStatus::Issued.is_final());
    }

    #[test]
    fn accepted_cannot_return_to_draft() {
        assert!(!RecordStatus::Accepted.can_transition_to(RecordStatus::Draft));
        assert!(!RecordStatus::Accepted.can_transition_to(RecordStatus::InReview));
    }

    #[rstest]
    #[case(RecordStatus::Draft, true)]
    #[case(RecordStatus::InReview, true)]
    #[case(RecordStatus::Rejected, true)]
    #[case(RecordStatus::Accepted, false)]
    #[case(RecordStatus::Issued, false)]
    #[case(RecordStatus::Archived, false)]
    #[case(RecordStatus::Cancelled, false)]
    fn can_edit_matches_editable_set(#[case] status: RecordStatus, #[case] editable: bool) {
        assert_eq!(status.can_edit(), editable);
    }

    #[rstest]
    #[case(RecordStatus::Draft, true)]
    #[case(RecordStatus::Rejected, true)]
    #[case(RecordStatus::InReview, false)]
    #[case(RecordStatus::Accepted, false)]
    #[case(RecordStatus::Issued, false)]
    #[case(RecordStatus::Archived, false)]
    #[case(RecordStatus::Cancelled, false)]
    fn can_delete_is_draft_or_rejected_only(#[case] status: RecordStatus, #[case] ok: bool) {
        assert_eq!(status.can_delete(), ok);
    }

    // --- Display / as_str ---

    #[test]
    fn display_matches_as_str() {
        assert_eq!(format!("{}", RecordStatus::InReview), "in_review");
        assert_eq!(format!("{}", Role::Super), "super");
        assert_eq!(
            format!("{}", WorkflowAction::ApproveOrReject),
            "approve_or_reject"
        );
        assert_eq!(format!("{}", AuditAction::View), "view");
        assert_eq!(format!("{}", RecordKind::Certificate), "certificate");
    }

    #[test]
    fn table_names() {
        assert_eq!(RecordKind::School.table_name(), "schools");
        assert_eq!(RecordKind::Student.table_name(), "students");
        assert_eq!(RecordKind::Certificate.table_name(), "certificates");
        assert_eq!(RecordKind::User.table_name(), "users");
    }
}
