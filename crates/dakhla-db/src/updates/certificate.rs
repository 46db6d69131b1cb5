//! Certificate update builder.

use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, Default, Serialize)]
pub struct CertificateUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serial_no: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub general_register_ref: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_school: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admission_date: Option<Option<NaiveDate>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admission_class: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress_in_studies: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conduct: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub leaving_date: Option<Option<NaiveDate>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub leaving_class: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason_for_leaving: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remarks: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certificate_date: Option<Option<NaiveDate>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_teacher_name: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clerk_name: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headmaster_name: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<Option<String>>,
}

pub struct CertificateUpdateBuilder(CertificateUpdate);

impl CertificateUpdateBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self(CertificateUpdate::default())
    }

    #[must_use]
    pub fn serial_no(mut self, value: Option<String>) -> Self {
        self.0.serial_no = Some(value);
        self
    }

    #[must_use]
    pub fn general_register_ref(mut self, value: Option<String>) -> Self {
        self.0.general_register_ref = Some(value);
        self
    }

    #[must_use]
    pub fn previous_school(mut self, value: Option<String>) -> Self {
        self.0.previous_school = Some(value);
        self
    }

    #[must_use]
    pub fn admission_date(mut self, value: Option<NaiveDate>) -> Self {
        self.0.admission_date = Some(value);
        self
    }

    #[must_use]
    pub fn admission_class(mut self, value: Option<String>) -> Self {
        self.0.admission_class = Some(value);
        self
    }

    #[must_use]
    pub fn progress_in_studies(mut self, value: Option<String>) -> Self {
        self.0.progress_in_studies = Some(value);
        self
    }

    #[must_use]
    pub fn conduct(mut self, value: Option<String>) -> Self {
        self.0.conduct = Some(value);
        self
    }

    #[must_use]
    pub fn leaving_date(mut self, value: Option<NaiveDate>) -> Self {
        self.0.leaving_date = Some(value);
        self
    }

    #[must_use]
    pub fn leaving_class(mut self, value: Option<String>) -> Self {
        self.0.leaving_class = Some(value);
        self
    }

    #[must_use]
    pub fn reason_for_leaving(mut self, value: Option<String>) -> Self {
        self.0.reason_for_leaving = Some(value);
        self
    }

    #[must_use]
    pub fn remarks(mut self, value: Option<String>) -> Self {
        self.0.remarks = Some(value);
        self
    }

    #[must_use]
    pub fn certificate_date(mut self, value: Option<NaiveDate>) -> Self {
        self.0.certificate_date = Some(value);
        self
    }

    #[must_use]
    pub fn class_teacher_name(mut self, value: Option<String>) -> Self {
        self.0.class_teacher_name = Some(value);
        self
    }

    #[must_use]
    pub fn clerk_name(mut self, value: Option<String>) -> Self {
        self.0.clerk_name = Some(value);
        self
    }

    #[must_use]
    pub fn headmaster_name(mut self, value: Option<String>) -> Self {
        self.0.headmaster_name = Some(value);
        self
    }

    #[must_use]
    pub fn comment(mut self, value: Option<String>) -> Self {
        self.0.comment = Some(value);
        self
    }

    #[must_use]
    pub fn build(self) -> CertificateUpdate {
        self.0
    }
}

impl Default for CertificateUpdateBuilder {
    fn default() -> Self {
        Self::new()
    }
}
