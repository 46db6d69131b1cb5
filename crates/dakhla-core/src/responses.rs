//! Response types returned as JSON by `dkl` commands.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::RecordStatus;

/// Pagination metadata accompanying list responses.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct PageMeta {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub total_pages: u32,
}

impl PageMeta {
    #[must_use]
    pub fn new(page: u32, limit: u32, total: u64) -> Self {
        let total_pages = if limit == 0 {
            0
        } else {
            u32::try_from(total.div_ceil(u64::from(limit))).unwrap_or(u32::MAX)
        };
        Self {
            page,
            limit,
            total,
            total_pages,
        }
    }

    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}

/// One page of results.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub pagination: PageMeta,
}

/// Allowed-transitions introspection for a record.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct TransitionOptions {
    pub current_status: RecordStatus,
    pub allowed_transitions: Vec<RecordStatus>,
    pub can_edit: bool,
    pub is_final_state: bool,
}

impl TransitionOptions {
    #[must_use]
    pub fn for_status(status: RecordStatus) -> Self {
        Self {
            current_status: status,
            allowed_transitions: status.allowed_next_states().to_vec(),
            can_edit: status.can_edit(),
            is_final_state: status.is_final(),
        }
    }
}

/// Error envelope emitted on the CLI boundary.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ErrorBody {
    pub kind: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn page_meta_rounds_up() {
        let meta = PageMeta::new(1, 10, 25);
        assert_eq!(meta.total_pages, 3);
        assert!(meta.has_next());
        let last = PageMeta::new(3, 10, 25);
        assert!(!last.has_next());
    }

    #[test]
    fn transition_options_reflect_state_machine() {
        let opts = TransitionOptions::for_status(RecordStatus::Rejected);
        assert_eq!(
            opts.allowed_transitions,
            vec![RecordStatus::InReview, RecordStatus::Cancelled]
        );
        assert!(opts.can_edit);
        assert!(!opts.is_final_state);

        let terminal = TransitionOptions::for_status(RecordStatus::Cancelled);
        assert!(terminal.allowed_transitions.is_empty());
        assert!(terminal.is_final_state);
    }
}
