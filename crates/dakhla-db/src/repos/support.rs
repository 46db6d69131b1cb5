//! Shared identifier-policy and diffing support for the record repos.

use dakhla_core::errors::{DomainError, FieldError};

use crate::error::DatabaseError;
use crate::helpers::json_value_to_audit_string;
use crate::service::DakhlaService;
use dakhla_core::audit_detail::FieldChange;

/// Treat empty and whitespace-only values the same as absent ones.
pub(crate) fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Enforce the "at least one external identifier" policy.
///
/// `pairs` holds `(column, value)` for every identifier column of the record.
pub(crate) fn require_identifier(
    pairs: &[(&str, Option<&str>)],
    columns: &[&str],
) -> Result<(), DomainError> {
    if pairs.iter().any(|(_, v)| non_empty(*v).is_some()) {
        Ok(())
    } else {
        Err(DomainError::Validation {
            errors: vec![FieldError::new(
                "identifier",
                format!("at least one of {} must be provided", columns.join(", ")),
            )],
        })
    }
}

impl DakhlaService {
    /// Pre-check every non-empty identifier value for an existing row.
    ///
    /// `exclude_id` skips the record itself on updates. This is advisory:
    /// the partial unique indexes remain the authority under concurrency,
    /// and a losing racer is translated by
    /// [`crate::error::translate_write_error`].
    pub(crate) async fn check_duplicate_identifiers(
        &self,
        table: &str,
        pairs: &[(&str, Option<&str>)],
        exclude_id: Option<&str>,
    ) -> Result<(), DomainError> {
        let mut conflicting = Vec::new();

        for (column, value) in pairs {
            let Some(value) = non_empty(*value) else {
                continue;
            };

            let sql = exclude_id.map_or_else(
                || format!("SELECT id FROM {table} WHERE {column} = ?1 AND {column} != '' LIMIT 1"),
                |_| {
                    format!(
                        "SELECT id FROM {table} WHERE {column} = ?1 AND {column} != '' AND id != ?2 LIMIT 1"
                    )
                },
            );
            let params: Vec<libsql::Value> = match exclude_id {
                Some(id) => vec![value.into(), id.into()],
                None => vec![value.into()],
            };

            let mut rows = self
                .db()
                .conn()
                .query(&sql, libsql::params_from_iter(params))
                .await
                .map_err(DatabaseError::from)?;
            if rows
                .next()
                .await
                .map_err(DatabaseError::from)?
                .is_some()
            {
                conflicting.push((*column).to_string());
            }
        }

        if conflicting.is_empty() {
            Ok(())
        } else {
            Err(DomainError::DuplicateIdentifier {
                fields: conflicting,
            })
        }
    }

    /// Shared COUNT(*) helper for the list/count pairs.
    pub(crate) async fn count_rows(
        &self,
        table: &str,
        where_clause: &str,
        params: Vec<libsql::Value>,
    ) -> Result<u64, DomainError> {
        let sql = format!("SELECT COUNT(*) FROM {table} {where_clause}");
        let mut rows = self
            .db()
            .conn()
            .query(&sql, libsql::params_from_iter(params))
            .await
            .map_err(DatabaseError::from)?;
        let row = rows
            .next()
            .await
            .map_err(DatabaseError::from)?
            .ok_or(DatabaseError::NoResult)?;
        Ok(u64::try_from(row.get::<i64>(0).map_err(DatabaseError::from)?).unwrap_or(0))
    }
}

/// Field-level diff between an old row snapshot and the changed-fields map of
/// an update. Emits one [`FieldChange`] per key of `changed` whose normalized
/// value differs from the old snapshot; untouched and unchanged fields
/// produce nothing.
pub(crate) fn diff_changed_fields(
    old: &serde_json::Value,
    changed: &serde_json::Value,
) -> Vec<FieldChange> {
    let serde_json::Value::Object(changed) = changed else {
        return Vec::new();
    };
    let empty = serde_json::Map::new();
    let old = old.as_object().unwrap_or(&empty);

    changed
        .iter()
        .filter_map(|(field, new_value)| {
            let old_value = old.get(field).unwrap_or(&serde_json::Value::Null);
            let old_str = json_value_to_audit_string(old_value);
            let new_str = json_value_to_audit_string(new_value);
            (old_str != new_str).then(|| FieldChange {
                field: field.clone(),
                old_value: old_str,
                new_value: new_str,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn non_empty_trims() {
        assert_eq!(non_empty(Some("  REC-1 ")), Some("REC-1"));
        assert_eq!(non_empty(Some("   ")), None);
        assert_eq!(non_empty(Some("")), None);
        assert_eq!(non_empty(None), None);
    }

    #[test]
    fn require_identifier_accepts_any_non_empty() {
        let cols = ["student_id", "uid_aadhar_no"];
        assert!(require_identifier(&[("student_id", Some("GR-9")), ("uid_aadhar_no", None)], &cols).is_ok());
        let err =
            require_identifier(&[("student_id", Some("")), ("uid_aadhar_no", None)], &cols)
                .unwrap_err();
        assert_eq!(err.kind(), "validation");
    }

    #[test]
    fn diff_skips_unchanged_and_untouched_fields() {
        let old = json!({"full_name": "Asha", "religion": "Hindu", "caste": null});
        let changed = json!({"full_name": "Asha", "religion": "Jain"});
        let changes = diff_changed_fields(&old, &changed);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].field, "religion");
        assert_eq!(changes[0].old_value.as_deref(), Some("Hindu"));
        assert_eq!(changes[0].new_value.as_deref(), Some("Jain"));
    }

    #[test]
    fn diff_counts_every_changed_field() {
        let old = json!({"a": "1", "b": "2", "c": "3"});
        let changed = json!({"a": "x", "b": "y", "c": "3"});
        assert_eq!(diff_changed_fields(&old, &changed).len(), 2);
    }

    #[test]
    fn identical_payloads_diff_to_nothing() {
        let old = json!({"a": "1", "b": null});
        assert!(diff_changed_fields(&old, &old).is_empty());
    }

    #[test]
    fn clearing_a_field_is_a_change() {
        let old = json!({"remarks": "promoted"});
        let changed = json!({"remarks": null});
        let changes = diff_changed_fields(&old, &changed);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].new_value, None);
    }
}
