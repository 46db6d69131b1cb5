//! Pagination and sort plumbing shared by the list queries.
//!
//! Sort keys are resolved against per-repo allow-lists and never
//! interpolated from caller input; an unknown key is rejected with a
//! validation error rather than defaulted, so list semantics stay
//! deterministic.

use dakhla_core::errors::DomainError;

/// Hard cap on page sizes regardless of configuration.
pub const MAX_LIMIT: u32 = 100;

/// A 1-based page request with a clamped limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    page: u32,
    limit: u32,
}

impl Pagination {
    /// Build a pagination request. `page` is clamped to ≥ 1, `limit` to
    /// `1..=MAX_LIMIT`.
    #[must_use]
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page: page.max(1),
            limit: limit.clamp(1, MAX_LIMIT),
        }
    }

    #[must_use]
    pub const fn page(self) -> u32 {
        self.page
    }

    #[must_use]
    pub const fn limit(self) -> u32 {
        self.limit
    }

    #[must_use]
    pub const fn offset(self) -> u32 {
        (self.page - 1) * self.limit
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(1, 20)
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// A caller-supplied sort request.
#[derive(Debug, Clone, Default)]
pub struct SortSpec {
    /// Requested sort column; `None` means the repo's default ordering.
    pub key: Option<String>,
    pub order: SortOrder,
}

/// Resolve a requested sort key against an allow-list of sortable columns.
///
/// Returns the static column name so only allow-listed strings ever reach
/// the SQL text.
///
/// # Errors
///
/// Returns a `Validation` error naming the key when it is not sortable.
pub fn resolve_sort_key(
    spec: &SortSpec,
    allowed: &[&'static str],
    default: &'static str,
) -> Result<&'static str, DomainError> {
    match spec.key.as_deref() {
        None => Ok(default),
        Some(requested) => allowed
            .iter()
            .find(|col| **col == requested)
            .copied()
            .ok_or_else(|| {
                DomainError::validation(
                    "sort_by",
                    format!(
                        "'{requested}' is not sortable; allowed: {}",
                        allowed.join(", ")
                    ),
                )
            }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_clamps_and_offsets() {
        let p = Pagination::new(0, 0);
        assert_eq!(p.page(), 1);
        assert_eq!(p.limit(), 1);
        assert_eq!(p.offset(), 0);

        let p = Pagination::new(3, 250);
        assert_eq!(p.limit(), MAX_LIMIT);
        assert_eq!(p.offset(), 200);
    }

    #[test]
    fn unknown_sort_key_is_rejected_not_defaulted() {
        let spec = SortSpec {
            key: Some("1; DROP TABLE students".to_string()),
            order: SortOrder::Asc,
        };
        let err = resolve_sort_key(&spec, &["full_name", "created_at"], "created_at").unwrap_err();
        assert_eq!(err.kind(), "validation");
        assert!(err.to_string().contains("not sortable"));
    }

    #[test]
    fn allowed_sort_key_resolves_to_static_column() {
        let spec = SortSpec {
            key: Some("full_name".to_string()),
            order: SortOrder::Asc,
        };
        let col = resolve_sort_key(&spec, &["full_name", "created_at"], "created_at").unwrap();
        assert_eq!(col, "full_name");
    }

    #[test]
    fn missing_key_uses_default() {
        let col = resolve_sort_key(&SortSpec::default(), &["full_name"], "created_at").unwrap();
        assert_eq!(col, "created_at");
    }
}
