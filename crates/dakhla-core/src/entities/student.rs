use chrono::{DateTime, NaiveDate, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::RecordStatus;
use crate::policy::HasStatus;

/// A student record. Identified externally by `student_id` (general register
/// number) or `uid_aadhar_no`; at least one must be present.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Student {
    pub id: String,
    pub student_id: Option<String>,
    pub uid_aadhar_no: Option<String>,
    pub full_name: String,
    pub father_name: Option<String>,
    pub mother_name: Option<String>,
    pub surname: Option<String>,
    pub nationality: Option<String>,
    pub mother_tongue: Option<String>,
    pub religion: Option<String>,
    pub caste: Option<String>,
    pub birth_place_village: Option<String>,
    pub birth_place_district: Option<String>,
    pub birth_place_state: Option<String>,
    pub date_of_birth: NaiveDate,
    pub date_of_birth_words: Option<String>,
    pub status: RecordStatus,
    pub comment: Option<String>,
    pub created_by: Option<String>,
    pub updated_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Student {
    pub const IDENTIFIER_FIELDS: [&'static str; 2] = ["student_id", "uid_aadhar_no"];
}

impl HasStatus for Student {
    fn status(&self) -> RecordStatus {
        self.status
    }
}
