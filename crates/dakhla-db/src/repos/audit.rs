//! Audit trail repository.
//!
//! Append-only audit rows recording every observed action: inserts, updates
//! (one row per changed field), deletes, views, logins, and logouts.
//!
//! All `record_*` methods are fire-and-forget relative to the caller's
//! primary operation: a failed audit write is logged via `tracing::warn!`
//! and swallowed. The audit trail is best-effort by contract and must never
//! fail or roll back the mutation it describes.

use chrono::{DateTime, Utc};

use dakhla_core::entities::AuditEntry;
use dakhla_core::enums::AuditAction;
use dakhla_core::identity::{Actor, Origin};
use dakhla_core::ids::PREFIX_AUDIT;
use dakhla_core::responses::{Page, PageMeta};

use crate::error::DatabaseError;
use crate::filters::Pagination;
use crate::helpers::{get_opt_string, parse_datetime, parse_enum};
use crate::repos::support::diff_changed_fields;
use crate::service::DakhlaService;
use dakhla_core::errors::DomainError;

/// Filter criteria for audit queries.
#[derive(Debug, Default)]
pub struct AuditFilter {
    pub table_name: Option<String>,
    pub record_id: Option<String>,
    pub changed_by: Option<String>,
    pub action: Option<AuditAction>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

const SELECT_COLS: &str = "id, table_name, record_id, action, field_name, old_value, new_value, \
     changed_by, ip_address, user_agent, location, note, changed_at";

fn row_to_entry(row: &libsql::Row) -> Result<AuditEntry, DatabaseError> {
    Ok(AuditEntry {
        id: row.get(0)?,
        table_name: row.get(1)?,
        record_id: row.get(2)?,
        action: parse_enum(&row.get::<String>(3)?)?,
        field_name: get_opt_string(row, 4)?,
        old_value: get_opt_string(row, 5)?,
        new_value: get_opt_string(row, 6)?,
        changed_by: get_opt_string(row, 7)?,
        ip_address: get_opt_string(row, 8)?,
        user_agent: get_opt_string(row, 9)?,
        location: get_opt_string(row, 10)?,
        note: get_opt_string(row, 11)?,
        changed_at: parse_datetime(&row.get::<String>(12)?)?,
    })
}

/// One pending audit row.
struct NewAudit<'a> {
    table_name: &'a str,
    record_id: &'a str,
    action: AuditAction,
    field_name: Option<&'a str>,
    old_value: Option<&'a str>,
    new_value: Option<&'a str>,
    changed_by: Option<&'a str>,
    origin: &'a Origin,
    note: Option<&'a str>,
}

impl DakhlaService {
    /// Append one audit row. Internal; callers go through the `record_*`
    /// wrappers which own the swallow-and-log contract.
    async fn append_audit(&self, entry: &NewAudit<'_>) -> Result<(), DatabaseError> {
        let id = self.db().generate_id(PREFIX_AUDIT).await?;
        self.db()
            .conn()
            .execute(
                &format!(
                    "INSERT INTO audit_log ({SELECT_COLS})
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)"
                ),
                libsql::params![
                    id.as_str(),
                    entry.table_name,
                    entry.record_id,
                    entry.action.as_str(),
                    entry.field_name,
                    entry.old_value,
                    entry.new_value,
                    entry.changed_by,
                    entry.origin.ip_address.as_deref(),
                    entry.origin.user_agent.as_deref(),
                    entry.origin.location.as_deref(),
                    entry.note,
                    Utc::now().to_rfc3339()
                ],
            )
            .await?;
        Ok(())
    }

    /// Run one best-effort append, logging instead of propagating failure.
    async fn append_audit_best_effort(&self, entry: &NewAudit<'_>) {
        if let Err(error) = self.append_audit(entry).await {
            tracing::warn!(
                table = entry.table_name,
                record = entry.record_id,
                action = %entry.action,
                %error,
                "audit write failed; continuing without it"
            );
        }
    }

    /// Record that `actor` viewed a record.
    pub async fn record_view(&self, actor: &Actor, table: &str, record_id: &str, origin: &Origin) {
        self.append_audit_best_effort(&NewAudit {
            table_name: table,
            record_id,
            action: AuditAction::View,
            field_name: None,
            old_value: None,
            new_value: None,
            changed_by: Some(&actor.id),
            origin,
            note: None,
        })
        .await;
    }

    /// Record a creation, with the inserted payload as the note.
    pub async fn record_add(
        &self,
        actor: &Actor,
        table: &str,
        record_id: &str,
        origin: &Origin,
        snapshot: &serde_json::Value,
    ) {
        let note = snapshot.to_string();
        self.append_audit_best_effort(&NewAudit {
            table_name: table,
            record_id,
            action: AuditAction::Insert,
            field_name: None,
            old_value: None,
            new_value: None,
            changed_by: Some(&actor.id),
            origin,
            note: Some(&note),
        })
        .await;
    }

    /// Record an update at field-level granularity: one row per key of
    /// `changed` whose value differs from `old`; unchanged fields are
    /// skipped entirely.
    pub async fn record_update(
        &self,
        actor: &Actor,
        table: &str,
        record_id: &str,
        origin: &Origin,
        old: &serde_json::Value,
        changed: &serde_json::Value,
    ) {
        for change in diff_changed_fields(old, changed) {
            self.append_audit_best_effort(&NewAudit {
                table_name: table,
                record_id,
                action: AuditAction::Update,
                field_name: Some(&change.field),
                old_value: change.old_value.as_deref(),
                new_value: change.new_value.as_deref(),
                changed_by: Some(&actor.id),
                origin,
                note: None,
            })
            .await;
        }
    }

    /// Record a deletion.
    pub async fn record_delete(&self, actor: &Actor, table: &str, record_id: &str, origin: &Origin) {
        self.append_audit_best_effort(&NewAudit {
            table_name: table,
            record_id,
            action: AuditAction::Delete,
            field_name: None,
            old_value: None,
            new_value: None,
            changed_by: Some(&actor.id),
            origin,
            note: None,
        })
        .await;
    }

    /// Record a login, noting the method used.
    pub async fn record_login(&self, actor: &Actor, origin: &Origin, method: &str) {
        let note = format!("login method: {method}");
        self.append_audit_best_effort(&NewAudit {
            table_name: "users",
            record_id: &actor.id,
            action: AuditAction::Login,
            field_name: None,
            old_value: None,
            new_value: None,
            changed_by: Some(&actor.id),
            origin,
            note: Some(&note),
        })
        .await;
    }

    /// Record a logout.
    pub async fn record_logout(&self, actor: &Actor, origin: &Origin) {
        self.append_audit_best_effort(&NewAudit {
            table_name: "users",
            record_id: &actor.id,
            action: AuditAction::Logout,
            field_name: None,
            old_value: None,
            new_value: None,
            changed_by: Some(&actor.id),
            origin,
            note: None,
        })
        .await;
    }

    /// Full audit trail of one record, most recent first.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the query fails.
    pub async fn audit_for_record(
        &self,
        table: &str,
        record_id: &str,
    ) -> Result<Vec<AuditEntry>, DomainError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!(
                    "SELECT {SELECT_COLS} FROM audit_log
                     WHERE table_name = ?1 AND record_id = ?2
                     ORDER BY changed_at DESC, id DESC"
                ),
                libsql::params![table, record_id],
            )
            .await
            .map_err(DatabaseError::from)?;

        let mut entries = Vec::new();
        while let Some(row) = rows.next().await.map_err(DatabaseError::from)? {
            entries.push(row_to_entry(&row)?);
        }
        Ok(entries)
    }

    /// Query audit entries with optional filters and pagination, most recent
    /// first.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the query fails.
    pub async fn query_audit(
        &self,
        filter: &AuditFilter,
        page: Pagination,
    ) -> Result<Page<AuditEntry>, DomainError> {
        let (where_clause, params) = build_where(filter);

        let total = self
            .count_rows("audit_log", &where_clause, params.clone())
            .await?;

        let sql = format!(
            "SELECT {SELECT_COLS} FROM audit_log {where_clause}
             ORDER BY changed_at DESC, id DESC LIMIT {} OFFSET {}",
            page.limit(),
            page.offset()
        );
        let mut rows = self
            .db()
            .conn()
            .query(&sql, libsql::params_from_iter(params))
            .await
            .map_err(DatabaseError::from)?;

        let mut entries = Vec::new();
        while let Some(row) = rows.next().await.map_err(DatabaseError::from)? {
            entries.push(row_to_entry(&row)?);
        }

        Ok(Page {
            items: entries,
            pagination: PageMeta::new(page.page(), page.limit(), total),
        })
    }
}

fn build_where(filter: &AuditFilter) -> (String, Vec<libsql::Value>) {
    let mut conditions = Vec::new();
    let mut params: Vec<libsql::Value> = Vec::new();

    if let Some(ref table) = filter.table_name {
        params.push(table.clone().into());
        conditions.push(format!("table_name = ?{}", params.len()));
    }
    if let Some(ref record) = filter.record_id {
        params.push(record.clone().into());
        conditions.push(format!("record_id = ?{}", params.len()));
    }
    if let Some(ref user) = filter.changed_by {
        params.push(user.clone().into());
        conditions.push(format!("changed_by = ?{}", params.len()));
    }
    if let Some(action) = filter.action {
        params.push(action.as_str().into());
        conditions.push(format!("action = ?{}", params.len()));
    }
    if let Some(start) = filter.start_date {
        params.push(start.to_rfc3339().into());
        conditions.push(format!("changed_at >= ?{}", params.len()));
    }
    if let Some(end) = filter.end_date {
        params.push(end.to_rfc3339().into());
        conditions.push(format!("changed_at <= ?{}", params.len()));
    }

    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };
    (where_clause, params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::helpers::{admin_actor, new_student, test_service_with_users, user_actor};
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn login_and_logout_are_recorded() {
        let (svc, users) = test_service_with_users().await;
        let admin = admin_actor(&users);
        let origin = Origin {
            ip_address: Some("10.0.0.7".to_string()),
            user_agent: Some("dkl/0.1".to_string()),
            location: None,
        };

        svc.record_login(&admin, &origin, "password").await;
        svc.record_logout(&admin, &origin).await;

        let entries = svc.audit_for_record("users", &admin.id).await.unwrap();
        assert_eq!(entries.len(), 2);
        // Most recent first.
        assert_eq!(entries[0].action, AuditAction::Logout);
        assert_eq!(entries[1].action, AuditAction::Login);
        assert_eq!(entries[1].note.as_deref(), Some("login method: password"));
        assert_eq!(entries[1].ip_address.as_deref(), Some("10.0.0.7"));
    }

    #[tokio::test]
    async fn query_audit_filters_by_action_and_actor() {
        let (svc, users) = test_service_with_users().await;
        let admin = admin_actor(&users);
        let viewer = user_actor(&users);
        let origin = Origin::default();

        svc.create_student(&admin, new_student("Filters", "GR-QF"), &origin)
            .await
            .unwrap();
        svc.record_login(&admin, &origin, "password").await;
        svc.record_login(&viewer, &origin, "otp").await;

        let inserts = svc
            .query_audit(
                &AuditFilter {
                    action: Some(AuditAction::Insert),
                    ..Default::default()
                },
                Pagination::default(),
            )
            .await
            .unwrap();
        assert_eq!(inserts.items.len(), 1);
        assert_eq!(inserts.items[0].table_name, "students");

        let admin_entries = svc
            .query_audit(
                &AuditFilter {
                    changed_by: Some(admin.id.clone()),
                    ..Default::default()
                },
                Pagination::default(),
            )
            .await
            .unwrap();
        assert!(admin_entries.items.iter().all(|e| e.changed_by.as_deref() == Some(admin.id.as_str())));
        assert_eq!(admin_entries.items.len(), 2);
    }

    #[tokio::test]
    async fn query_audit_date_range_and_pagination() {
        let (svc, users) = test_service_with_users().await;
        let admin = admin_actor(&users);
        let origin = Origin::default();

        for i in 0..5 {
            svc.record_login(&admin, &origin, &format!("method-{i}")).await;
        }

        let page = svc
            .query_audit(
                &AuditFilter::default(),
                crate::filters::Pagination::new(1, 2),
            )
            .await
            .unwrap();
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.pagination.total, 5);
        assert_eq!(page.pagination.total_pages, 3);

        let future_only = svc
            .query_audit(
                &AuditFilter {
                    start_date: Some(Utc::now() + chrono::Duration::hours(1)),
                    ..Default::default()
                },
                Pagination::default(),
            )
            .await
            .unwrap();
        assert!(future_only.items.is_empty());
        assert_eq!(future_only.pagination.total, 0);
    }

    #[tokio::test]
    async fn deleting_a_user_nulls_the_audit_actor_but_keeps_rows() {
        let (svc, users) = test_service_with_users().await;
        let admin = admin_actor(&users);
        let origin = Origin::default();

        let student = svc
            .create_student(&admin, new_student("Orphaned Trail", "GR-ORP"), &origin)
            .await
            .unwrap();

        svc.delete_user(&users.admin.id).await.unwrap();

        let entries = svc.audit_for_record("students", &student.id).await.unwrap();
        assert!(!entries.is_empty(), "audit rows must survive the actor");
        assert!(entries.iter().all(|e| e.changed_by.is_none()));
    }
}
