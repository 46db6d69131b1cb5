//! JSON output envelopes.
//!
//! Success: `{"data": ...}` (lists carry their pagination inside the data).
//! Failure: an `ErrorBody` on stderr with the stable kind tag and, where the
//! error supports it, a `detail` object telling the caller what it could
//! legally do instead.

use dakhla_core::errors::DomainError;
use dakhla_core::responses::ErrorBody;

/// Marker: the domain error was already printed as JSON; main should exit
/// silently.
#[derive(Debug)]
pub struct Reported;

impl std::fmt::Display for Reported {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("error already reported")
    }
}

impl std::error::Error for Reported {}

/// Print a success envelope or the error body, converting domain errors into
/// the silent `Reported` marker.
pub fn emit<T: serde::Serialize>(result: Result<T, DomainError>) -> anyhow::Result<()> {
    match result {
        Ok(data) => {
            println!(
                "{}",
                serde_json::to_string_pretty(&serde_json::json!({ "data": data }))?
            );
            Ok(())
        }
        Err(error) => {
            let body = ErrorBody {
                kind: error.kind().to_string(),
                message: error.to_string(),
                detail: detail_for(&error),
            };
            eprintln!("{}", serde_json::to_string_pretty(&body)?);
            Err(Reported.into())
        }
    }
}

/// Structured guidance for the caller: allowed transitions, required role,
/// conflicting fields, field messages.
fn detail_for(error: &DomainError) -> Option<serde_json::Value> {
    match error {
        DomainError::InvalidTransition { from, to, allowed } => Some(serde_json::json!({
            "from": from,
            "to": to,
            "allowed_transitions": allowed,
        })),
        DomainError::Forbidden { required_role, .. } => {
            (*required_role).map(|role| serde_json::json!({ "required_role": role }))
        }
        DomainError::DuplicateIdentifier { fields } => {
            Some(serde_json::json!({ "fields": fields }))
        }
        DomainError::Validation { errors } => Some(serde_json::json!({ "errors": errors })),
        DomainError::NotFound { .. } | DomainError::Storage(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dakhla_core::enums::{RecordStatus, Role};

    #[test]
    fn detail_lists_allowed_transitions() {
        let err = DomainError::InvalidTransition {
            from: RecordStatus::Issued,
            to: RecordStatus::Draft,
            allowed: vec![RecordStatus::Archived],
        };
        let detail = detail_for(&err).unwrap();
        assert_eq!(detail["allowed_transitions"][0], "archived");
    }

    #[test]
    fn detail_names_required_role() {
        let err = DomainError::requires_role(Role::Super, "approval");
        let detail = detail_for(&err).unwrap();
        assert_eq!(detail["required_role"], "super");
    }
}
