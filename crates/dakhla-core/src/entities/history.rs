use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::RecordStatus;

/// An append-only status transition row, written only on successful
/// transitions.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct StatusHistoryEntry {
    pub id: String,
    pub table_name: String,
    pub record_id: String,
    pub old_status: RecordStatus,
    pub new_status: RecordStatus,
    pub changed_by: Option<String>,
    pub reason: Option<String>,
    pub note: Option<String>,
    pub changed_at: DateTime<Utc>,
}
