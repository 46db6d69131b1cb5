use chrono::{DateTime, NaiveDate, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::RecordStatus;
use crate::policy::HasStatus;

/// A leaving certificate, linking a student to the school being left.
/// Identified externally by `serial_no` or `general_register_ref`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Certificate {
    pub id: String,
    pub school_id: String,
    pub student_id: String,
    pub serial_no: Option<String>,
    pub general_register_ref: Option<String>,
    pub previous_school: Option<String>,
    pub admission_date: Option<NaiveDate>,
    pub admission_class: Option<String>,
    pub progress_in_studies: Option<String>,
    pub conduct: Option<String>,
    pub leaving_date: Option<NaiveDate>,
    pub leaving_class: Option<String>,
    pub reason_for_leaving: Option<String>,
    pub remarks: Option<String>,
    pub certificate_date: Option<NaiveDate>,
    pub class_teacher_name: Option<String>,
    pub clerk_name: Option<String>,
    pub headmaster_name: Option<String>,
    pub status: RecordStatus,
    pub issued_by: Option<String>,
    pub issued_at: Option<DateTime<Utc>>,
    pub comment: Option<String>,
    pub created_by: Option<String>,
    pub updated_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Certificate {
    pub const IDENTIFIER_FIELDS: [&'static str; 2] = ["serial_no", "general_register_ref"];
}

impl HasStatus for Certificate {
    fn status(&self) -> RecordStatus {
        self.status
    }
}

/// A certificate joined with the descriptive fields of its school and
/// student, for display. The joined fields are read-only and never written
/// back.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct CertificateDetail {
    #[serde(flatten)]
    pub certificate: Certificate,
    pub school_name: String,
    pub school_district: Option<String>,
    pub school_recognition_no: Option<String>,
    pub school_board: Option<String>,
    pub school_medium: Option<String>,
    pub student_full_name: String,
    pub student_surname: Option<String>,
    pub student_date_of_birth: NaiveDate,
    pub student_uid_aadhar_no: Option<String>,
}

impl HasStatus for CertificateDetail {
    fn status(&self) -> RecordStatus {
        self.certificate.status
    }
}
