use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::RecordStatus;
use crate::policy::HasStatus;

/// A registered school. At least one of the three identifier numbers
/// (`school_recognition_no`, `general_register_no`, `affiliation_no`) must be
/// present; each is unique among non-empty values.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct School {
    pub id: String,
    pub name: String,
    pub address: Option<String>,
    pub taluka: Option<String>,
    pub district: Option<String>,
    pub state: Option<String>,
    pub phone_no: Option<String>,
    pub email: Option<String>,
    pub general_register_no: Option<String>,
    pub school_recognition_no: Option<String>,
    pub udise_no: Option<String>,
    pub affiliation_no: Option<String>,
    pub board: Option<String>,
    pub medium: Option<String>,
    pub status: RecordStatus,
    pub comment: Option<String>,
    pub created_by: Option<String>,
    pub updated_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl School {
    /// The identifier columns subject to the uniqueness policy.
    pub const IDENTIFIER_FIELDS: [&'static str; 3] = [
        "school_recognition_no",
        "general_register_no",
        "affiliation_no",
    ];
}

impl HasStatus for School {
    fn status(&self) -> RecordStatus {
        self.status
    }
}
