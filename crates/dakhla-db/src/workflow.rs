//! Status transition workflow.
//!
//! The composition point of the core: every transition runs
//! validate → authorize → persist → history → audit, strictly in that
//! order. History and audit writes are best-effort — a failure there is
//! logged and never reverts the persisted status, while a persistence
//! failure aborts the whole operation before anything is logged.

use chrono::Utc;

use dakhla_core::entities::{Certificate, School, Student};
use dakhla_core::enums::{RecordKind, RecordStatus};
use dakhla_core::errors::DomainError;
use dakhla_core::identity::{Actor, Origin};
use dakhla_core::policy;
use dakhla_core::responses::TransitionOptions;

use crate::error::DatabaseError;
use crate::service::DakhlaService;

impl DakhlaService {
    /// Transition a school to `desired`.
    ///
    /// # Errors
    ///
    /// `NotFound`, `InvalidTransition`, `Forbidden`, or a storage error from
    /// the persisting update.
    pub async fn transition_school(
        &self,
        actor: &Actor,
        id: &str,
        desired: RecordStatus,
        reason: Option<&str>,
        comment: Option<&str>,
        origin: &Origin,
    ) -> Result<School, DomainError> {
        let current = self.fetch_school(id).await?;
        let old_status = current.status;
        if Self::authorize_transition(actor, old_status, desired)? {
            return Ok(current);
        }

        let now = Utc::now().to_rfc3339();
        self.db()
            .conn()
            .execute(
                "UPDATE schools SET status = ?1, updated_by = ?2, updated_at = ?3,
                 comment = COALESCE(?4, comment) WHERE id = ?5",
                libsql::params![desired.as_str(), actor.id.as_str(), now.as_str(), comment, id],
            )
            .await
            .map_err(DatabaseError::from)?;

        self.finish_transition(
            actor,
            RecordKind::School.table_name(),
            id,
            old_status,
            desired,
            reason,
            comment,
            origin,
        )
        .await;
        self.fetch_school(id).await
    }

    /// Transition a student to `desired`.
    ///
    /// # Errors
    ///
    /// `NotFound`, `InvalidTransition`, `Forbidden`, or a storage error from
    /// the persisting update.
    pub async fn transition_student(
        &self,
        actor: &Actor,
        id: &str,
        desired: RecordStatus,
        reason: Option<&str>,
        comment: Option<&str>,
        origin: &Origin,
    ) -> Result<Student, DomainError> {
        let current = self.fetch_student(id).await?;
        let old_status = current.status;
        if Self::authorize_transition(actor, old_status, desired)? {
            return Ok(current);
        }

        let now = Utc::now().to_rfc3339();
        self.db()
            .conn()
            .execute(
                "UPDATE students SET status = ?1, updated_by = ?2, updated_at = ?3,
                 comment = COALESCE(?4, comment) WHERE id = ?5",
                libsql::params![desired.as_str(), actor.id.as_str(), now.as_str(), comment, id],
            )
            .await
            .map_err(DatabaseError::from)?;

        self.finish_transition(
            actor,
            RecordKind::Student.table_name(),
            id,
            old_status,
            desired,
            reason,
            comment,
            origin,
        )
        .await;
        self.fetch_student(id).await
    }

    /// Transition a certificate to `desired`. Entering `issued` also stamps
    /// `issued_by` / `issued_at`.
    ///
    /// # Errors
    ///
    /// `NotFound`, `InvalidTransition`, `Forbidden`, or a storage error from
    /// the persisting update.
    pub async fn transition_certificate(
        &self,
        actor: &Actor,
        id: &str,
        desired: RecordStatus,
        reason: Option<&str>,
        comment: Option<&str>,
        origin: &Origin,
    ) -> Result<Certificate, DomainError> {
        let current = self.fetch_certificate(id).await?;
        let old_status = current.status;
        if Self::authorize_transition(actor, old_status, desired)? {
            return Ok(current);
        }

        let now = Utc::now().to_rfc3339();
        if desired == RecordStatus::Issued {
            self.db()
                .conn()
                .execute(
                    "UPDATE certificates SET status = ?1, updated_by = ?2, updated_at = ?3,
                     comment = COALESCE(?4, comment), issued_by = ?2, issued_at = ?3
                     WHERE id = ?5",
                    libsql::params![desired.as_str(), actor.id.as_str(), now.as_str(), comment, id],
                )
                .await
                .map_err(DatabaseError::from)?;
        } else {
            self.db()
                .conn()
                .execute(
                    "UPDATE certificates SET status = ?1, updated_by = ?2, updated_at = ?3,
                     comment = COALESCE(?4, comment) WHERE id = ?5",
                    libsql::params![desired.as_str(), actor.id.as_str(), now.as_str(), comment, id],
                )
                .await
                .map_err(DatabaseError::from)?;
        }

        self.finish_transition(
            actor,
            RecordKind::Certificate.table_name(),
            id,
            old_status,
            desired,
            reason,
            comment,
            origin,
        )
        .await;
        self.fetch_certificate(id).await
    }

    /// Allowed-transitions introspection for any record kind.
    ///
    /// # Errors
    ///
    /// `NotFound` when the record does not exist.
    pub async fn transition_options(
        &self,
        kind: RecordKind,
        id: &str,
    ) -> Result<TransitionOptions, DomainError> {
        let table = kind.table_name();
        let mut rows = self
            .db()
            .conn()
            .query(&format!("SELECT status FROM {table} WHERE id = ?1"), [id])
            .await
            .map_err(DatabaseError::from)?;
        let row = rows
            .next()
            .await
            .map_err(DatabaseError::from)?
            .ok_or_else(|| DomainError::NotFound {
                entity: kind,
                id: id.to_string(),
            })?;
        let status: RecordStatus =
            crate::helpers::parse_enum(&row.get::<String>(0).map_err(DatabaseError::from)?)?;
        Ok(TransitionOptions::for_status(status))
    }

    /// Steps 2–3 of the transition protocol: state machine validation and
    /// the role gate for the edge's action category. Returns `true` for an
    /// authorized same-state no-op.
    fn authorize_transition(
        actor: &Actor,
        current: RecordStatus,
        desired: RecordStatus,
    ) -> Result<bool, DomainError> {
        current.validate_transition(desired)?;
        let action = policy::action_for_transition(current, desired);
        policy::authorize(actor.role, action, current)?;
        Ok(current == desired)
    }

    /// Steps 5–6: history row and status audit, both best-effort.
    #[allow(clippy::too_many_arguments)]
    async fn finish_transition(
        &self,
        actor: &Actor,
        table: &str,
        id: &str,
        old_status: RecordStatus,
        new_status: RecordStatus,
        reason: Option<&str>,
        comment: Option<&str>,
        origin: &Origin,
    ) {
        if let Err(error) = self
            .append_status_history(table, id, old_status, new_status, &actor.id, reason, comment)
            .await
        {
            tracing::warn!(
                table,
                record = id,
                from = %old_status,
                to = %new_status,
                %error,
                "status history write failed; transition stands"
            );
        }

        self.record_update(
            actor,
            table,
            id,
            origin,
            &serde_json::json!({ "status": old_status.as_str() }),
            &serde_json::json!({ "status": new_status.as_str() }),
        )
        .await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::helpers::{
        admin_actor, new_certificate, new_school, new_student, super_actor, test_service_with_users,
        user_actor,
    };
    use dakhla_core::enums::AuditAction;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn review_lifecycle_happy_path() {
        let (svc, users) = test_service_with_users().await;
        let admin = admin_actor(&users);
        let sup = super_actor(&users);
        let origin = Origin::default();

        let student = svc
            .create_student(&admin, new_student("Lifecycle", "GR-L"), &origin)
            .await
            .unwrap();

        // Admin submits for review.
        let student = svc
            .transition_student(&admin, &student.id, RecordStatus::InReview, Some("complete"), None, &origin)
            .await
            .unwrap();
        assert_eq!(student.status, RecordStatus::InReview);

        let history = svc
            .status_history_for("students", &student.id)
            .await
            .unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].old_status, RecordStatus::Draft);
        assert_eq!(history[0].new_status, RecordStatus::InReview);
        assert_eq!(history[0].changed_by.as_deref(), Some(admin.id.as_str()));
        assert_eq!(history[0].reason.as_deref(), Some("complete"));

        // Super approves.
        let student = svc
            .transition_student(&sup, &student.id, RecordStatus::Accepted, None, None, &origin)
            .await
            .unwrap();
        assert_eq!(student.status, RecordStatus::Accepted);

        // Accepted has no edge back to draft.
        let err = svc
            .transition_student(&admin, &student.id, RecordStatus::Draft, None, None, &origin)
            .await
            .unwrap_err();
        match err {
            DomainError::InvalidTransition { from, to, allowed } => {
                assert_eq!(from, RecordStatus::Accepted);
                assert_eq!(to, RecordStatus::Draft);
                assert_eq!(allowed, vec![RecordStatus::Issued, RecordStatus::Archived]);
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[tokio::test]
    async fn approval_is_super_only_and_submission_admin_only() {
        let (svc, users) = test_service_with_users().await;
        let admin = admin_actor(&users);
        let sup = super_actor(&users);
        let viewer = user_actor(&users);
        let origin = Origin::default();

        let student = svc
            .create_student(&admin, new_student("Gated", "GR-GATE"), &origin)
            .await
            .unwrap();

        // Neither super nor user may submit for review.
        for actor in [&sup, &viewer] {
            let err = svc
                .transition_student(actor, &student.id, RecordStatus::InReview, None, None, &origin)
                .await
                .unwrap_err();
            assert_eq!(err.kind(), "forbidden");
        }

        svc.transition_student(&admin, &student.id, RecordStatus::InReview, None, None, &origin)
            .await
            .unwrap();

        // Admin may not approve.
        let err = svc
            .transition_student(&admin, &student.id, RecordStatus::Accepted, None, None, &origin)
            .await
            .unwrap_err();
        match &err {
            DomainError::Forbidden { required_role, .. } => {
                assert_eq!(*required_role, Some(dakhla_core::enums::Role::Super));
            }
            other => panic!("unexpected: {other:?}"),
        }

        // Status unchanged by the denied attempts.
        let current = svc.fetch_student(&student.id).await.unwrap();
        assert_eq!(current.status, RecordStatus::InReview);
    }

    #[tokio::test]
    async fn rejected_can_be_resubmitted() {
        let (svc, users) = test_service_with_users().await;
        let admin = admin_actor(&users);
        let sup = super_actor(&users);
        let origin = Origin::default();

        let student = svc
            .create_student(&admin, new_student("Resubmit", "GR-R"), &origin)
            .await
            .unwrap();
        svc.transition_student(&admin, &student.id, RecordStatus::InReview, None, None, &origin)
            .await
            .unwrap();
        svc.transition_student(&sup, &student.id, RecordStatus::Rejected, Some("missing dates"), None, &origin)
            .await
            .unwrap();
        let student = svc
            .transition_student(&admin, &student.id, RecordStatus::InReview, Some("dates added"), None, &origin)
            .await
            .unwrap();
        assert_eq!(student.status, RecordStatus::InReview);

        let history = svc
            .status_history_for("students", &student.id)
            .await
            .unwrap();
        assert_eq!(history.len(), 3);
        // Most recent first.
        assert_eq!(history[0].new_status, RecordStatus::InReview);
    }

    #[tokio::test]
    async fn same_state_is_a_noop_without_history() {
        let (svc, users) = test_service_with_users().await;
        let admin = admin_actor(&users);
        let origin = Origin::default();

        let student = svc
            .create_student(&admin, new_student("Noop", "GR-N"), &origin)
            .await
            .unwrap();
        let unchanged = svc
            .transition_student(&admin, &student.id, RecordStatus::Draft, None, None, &origin)
            .await
            .unwrap();
        assert_eq!(unchanged.status, RecordStatus::Draft);
        assert!(
            svc.status_history_for("students", &student.id)
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn issuing_a_certificate_stamps_issuer() {
        let (svc, users) = test_service_with_users().await;
        let admin = admin_actor(&users);
        let sup = super_actor(&users);
        let origin = Origin::default();

        let school = svc
            .create_school(&admin, new_school("Issue School", "REC-ISS"), &origin)
            .await
            .unwrap();
        let student = svc
            .create_student(&admin, new_student("Issued Kid", "GR-ISS"), &origin)
            .await
            .unwrap();
        let certificate = svc
            .create_certificate(&admin, new_certificate(&school.id, &student.id, "SER-ISS"), &origin)
            .await
            .unwrap();

        svc.transition_certificate(&admin, &certificate.id, RecordStatus::InReview, None, None, &origin)
            .await
            .unwrap();
        svc.transition_certificate(&sup, &certificate.id, RecordStatus::Accepted, None, None, &origin)
            .await
            .unwrap();
        let issued = svc
            .transition_certificate(&sup, &certificate.id, RecordStatus::Issued, None, None, &origin)
            .await
            .unwrap();

        assert_eq!(issued.status, RecordStatus::Issued);
        assert_eq!(issued.issued_by.as_deref(), Some(sup.id.as_str()));
        assert!(issued.issued_at.is_some());

        // Admin may not issue.
        let school2 = svc
            .create_school(&admin, new_school("Issue School 2", "REC-IS2"), &origin)
            .await
            .unwrap();
        let cert2 = svc
            .create_certificate(&admin, new_certificate(&school2.id, &student.id, "SER-IS2"), &origin)
            .await
            .unwrap();
        svc.transition_certificate(&admin, &cert2.id, RecordStatus::InReview, None, None, &origin)
            .await
            .unwrap();
        svc.transition_certificate(&sup, &cert2.id, RecordStatus::Accepted, None, None, &origin)
            .await
            .unwrap();
        assert_eq!(
            svc.transition_certificate(&admin, &cert2.id, RecordStatus::Issued, None, None, &origin)
                .await
                .unwrap_err()
                .kind(),
            "forbidden"
        );
    }

    #[tokio::test]
    async fn cancelling_editable_records_is_an_admin_edit() {
        let (svc, users) = test_service_with_users().await;
        let admin = admin_actor(&users);
        let sup = super_actor(&users);
        let origin = Origin::default();

        let student = svc
            .create_student(&admin, new_student("Cancel Me", "GR-C"), &origin)
            .await
            .unwrap();

        // Super cannot cancel a draft (only admin edits drafts).
        assert_eq!(
            svc.transition_student(&sup, &student.id, RecordStatus::Cancelled, None, None, &origin)
                .await
                .unwrap_err()
                .kind(),
            "forbidden"
        );

        let cancelled = svc
            .transition_student(&admin, &student.id, RecordStatus::Cancelled, Some("withdrawn"), None, &origin)
            .await
            .unwrap();
        assert_eq!(cancelled.status, RecordStatus::Cancelled);

        // Terminal: nothing leaves cancelled.
        assert_eq!(
            svc.transition_student(&admin, &student.id, RecordStatus::Draft, None, None, &origin)
                .await
                .unwrap_err()
                .kind(),
            "invalid_transition"
        );
    }

    #[tokio::test]
    async fn transition_audits_the_status_field() {
        let (svc, users) = test_service_with_users().await;
        let admin = admin_actor(&users);
        let origin = Origin::default();

        let student = svc
            .create_student(&admin, new_student("Audited Move", "GR-AM"), &origin)
            .await
            .unwrap();
        svc.transition_student(&admin, &student.id, RecordStatus::InReview, None, None, &origin)
            .await
            .unwrap();

        let entries = svc.audit_for_record("students", &student.id).await.unwrap();
        let status_updates: Vec<_> = entries
            .iter()
            .filter(|e| e.action == AuditAction::Update && e.field_name.as_deref() == Some("status"))
            .collect();
        assert_eq!(status_updates.len(), 1);
        assert_eq!(status_updates[0].old_value.as_deref(), Some("draft"));
        assert_eq!(status_updates[0].new_value.as_deref(), Some("in_review"));
    }

    #[tokio::test]
    async fn audit_outage_does_not_fail_the_transition() {
        let (svc, users) = test_service_with_users().await;
        let admin = admin_actor(&users);
        let origin = Origin::default();

        let student = svc
            .create_student(&admin, new_student("Outage", "GR-OUT"), &origin)
            .await
            .unwrap();

        // Simulate an audit-store outage; foreign keys must be off for the
        // drop since audit_log references users.
        svc.db()
            .conn()
            .execute("PRAGMA foreign_keys = OFF", ())
            .await
            .unwrap();
        svc.db().conn().execute("DROP TABLE audit_log", ()).await.unwrap();
        svc.db()
            .conn()
            .execute("DROP TABLE status_history", ())
            .await
            .unwrap();

        let moved = svc
            .transition_student(&admin, &student.id, RecordStatus::InReview, None, None, &origin)
            .await
            .unwrap();
        assert_eq!(moved.status, RecordStatus::InReview);
    }

    #[tokio::test]
    async fn transition_options_reports_the_edge_set() {
        let (svc, users) = test_service_with_users().await;
        let admin = admin_actor(&users);
        let origin = Origin::default();

        let student = svc
            .create_student(&admin, new_student("Introspect", "GR-INT"), &origin)
            .await
            .unwrap();
        let options = svc
            .transition_options(RecordKind::Student, &student.id)
            .await
            .unwrap();
        assert_eq!(options.current_status, RecordStatus::Draft);
        assert_eq!(
            options.allowed_transitions,
            vec![RecordStatus::InReview, RecordStatus::Cancelled]
        );
        assert!(options.can_edit);
        assert!(!options.is_final_state);

        assert_eq!(
            svc.transition_options(RecordKind::Student, "stu-missing")
                .await
                .unwrap_err()
                .kind(),
            "not_found"
        );
    }

    #[tokio::test]
    async fn unknown_record_is_not_found_before_any_check() {
        let (svc, users) = test_service_with_users().await;
        let admin = admin_actor(&users);
        assert_eq!(
            svc.transition_student(&admin, "stu-missing", RecordStatus::InReview, None, None, &Origin::default())
                .await
                .unwrap_err()
                .kind(),
            "not_found"
        );
    }
}
