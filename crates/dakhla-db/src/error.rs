//! Database error types and translation into domain error kinds.

use dakhla_core::errors::DomainError;
use thiserror::Error;

/// Errors from database operations.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// A SQL query failed.
    #[error("Query failed: {0}")]
    Query(String),

    /// Schema migration failed.
    #[error("Migration failed: {0}")]
    Migration(String),

    /// Expected a result row but none was returned.
    #[error("No result returned")]
    NoResult,

    /// Underlying libSQL error.
    #[error("libSQL error: {0}")]
    LibSql(#[from] libsql::Error),

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<DatabaseError> for DomainError {
    fn from(err: DatabaseError) -> Self {
        Self::Storage(err.into())
    }
}

/// Inspect a libSQL failure for a UNIQUE-constraint violation on one of the
/// given identifier columns.
///
/// Two concurrent creates with the same identifier both pass the
/// application-level pre-check; the partial unique index rejects the loser,
/// and this translation turns that into the same `DuplicateIdentifier` the
/// pre-check would have produced.
pub(crate) fn unique_violation_fields(
    err: &libsql::Error,
    identifier_fields: &[&str],
) -> Option<Vec<String>> {
    let msg = err.to_string();
    if !msg.contains("UNIQUE constraint failed") {
        return None;
    }
    let fields: Vec<String> = identifier_fields
        .iter()
        .filter(|field| msg.contains(&format!(".{field}")))
        .map(|field| (*field).to_string())
        .collect();
    if fields.is_empty() {
        Some(vec!["unknown".to_string()])
    } else {
        Some(fields)
    }
}

/// Map an insert/update failure to `DuplicateIdentifier` when it is a
/// uniqueness race, `Storage` otherwise.
pub(crate) fn translate_write_error(err: libsql::Error, identifier_fields: &[&str]) -> DomainError {
    unique_violation_fields(&err, identifier_fields).map_or_else(
        || DatabaseError::from(err).into(),
        |fields| DomainError::DuplicateIdentifier { fields },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unique_violation_names_the_column() {
        let err = libsql::Error::SqliteFailure(
            2067,
            "UNIQUE constraint failed: students.uid_aadhar_no".to_string(),
        );
        let fields = unique_violation_fields(&err, &["student_id", "uid_aadhar_no"]).unwrap();
        assert_eq!(fields, vec!["uid_aadhar_no".to_string()]);
    }

    #[test]
    fn unique_violation_on_unlisted_column_falls_back_to_unknown() {
        let err = libsql::Error::SqliteFailure(
            2067,
            "UNIQUE constraint failed: users.username".to_string(),
        );
        let fields = unique_violation_fields(&err, &["student_id"]).unwrap();
        assert_eq!(fields, vec!["unknown".to_string()]);
    }

    #[test]
    fn non_unique_errors_pass_through_as_storage() {
        let err = libsql::Error::SqliteFailure(1, "no such table: students".to_string());
        assert!(unique_violation_fields(&err, &["student_id"]).is_none());
        let domain = translate_write_error(err, &["student_id"]);
        assert_eq!(domain.kind(), "storage_unavailable");
    }
}
