//! Status history repository.
//!
//! Append-only per-record log of status transitions, richer than the audit
//! trail in reason/notes. Written only by the workflow on successful
//! transitions; never mutated by domain logic.

use chrono::Utc;

use dakhla_core::entities::StatusHistoryEntry;
use dakhla_core::enums::RecordStatus;
use dakhla_core::errors::DomainError;
use dakhla_core::ids::PREFIX_HISTORY;

use crate::error::DatabaseError;
use crate::helpers::{get_opt_string, parse_datetime, parse_enum};
use crate::service::DakhlaService;

const SELECT_COLS: &str =
    "id, table_name, record_id, old_status, new_status, changed_by, reason, note, changed_at";

fn row_to_entry(row: &libsql::Row) -> Result<StatusHistoryEntry, DatabaseError> {
    Ok(StatusHistoryEntry {
        id: row.get(0)?,
        table_name: row.get(1)?,
        record_id: row.get(2)?,
        old_status: parse_enum(&row.get::<String>(3)?)?,
        new_status: parse_enum(&row.get::<String>(4)?)?,
        changed_by: get_opt_string(row, 5)?,
        reason: get_opt_string(row, 6)?,
        note: get_opt_string(row, 7)?,
        changed_at: parse_datetime(&row.get::<String>(8)?)?,
    })
}

impl DakhlaService {
    /// Append one transition row. Internal; the workflow wraps this in its
    /// own best-effort handling.
    #[allow(clippy::too_many_arguments)]
    pub(crate) async fn append_status_history(
        &self,
        table: &str,
        record_id: &str,
        old_status: RecordStatus,
        new_status: RecordStatus,
        changed_by: &str,
        reason: Option<&str>,
        note: Option<&str>,
    ) -> Result<(), DatabaseError> {
        let id = self.db().generate_id(PREFIX_HISTORY).await?;
        self.db()
            .conn()
            .execute(
                &format!(
                    "INSERT INTO status_history ({SELECT_COLS})
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)"
                ),
                libsql::params![
                    id.as_str(),
                    table,
                    record_id,
                    old_status.as_str(),
                    new_status.as_str(),
                    changed_by,
                    reason,
                    note,
                    Utc::now().to_rfc3339()
                ],
            )
            .await?;
        Ok(())
    }

    /// Status history of one record, most recent first.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the query fails.
    pub async fn status_history_for(
        &self,
        table: &str,
        record_id: &str,
    ) -> Result<Vec<StatusHistoryEntry>, DomainError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!(
                    "SELECT {SELECT_COLS} FROM status_history
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
}
