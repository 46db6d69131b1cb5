//! Student update builder.

use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, Default, Serialize)]
pub struct StudentUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student_id: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uid_aadhar_no: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub father_name: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mother_name: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub surname: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nationality: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mother_tongue: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub religion: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caste: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birth_place_village: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birth_place_district: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birth_place_state: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_of_birth_words: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<Option<String>>,
}

pub struct StudentUpdateBuilder(StudentUpdate);

impl StudentUpdateBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self(StudentUpdate::default())
    }

    #[must_use]
    pub fn student_id(mut self, value: Option<String>) -> Self {
        self.0.student_id = Some(value);
        self
    }

    #[must_use]
    pub fn uid_aadhar_no(mut self, value: Option<String>) -> Self {
        self.0.uid_aadhar_no = Some(value);
        self
    }

    #[must_use]
    pub fn full_name(mut self, full_name: impl Into<String>) -> Self {
        self.0.full_name = Some(full_name.into());
        self
    }

    #[must_use]
    pub fn father_name(mut self, value: Option<String>) -> Self {
        self.0.father_name = Some(value);
        self
    }

    #[must_use]
    pub fn mother_name(mut self, value: Option<String>) -> Self {
        self.0.mother_name = Some(value);
        self
    }

    #[must_use]
    pub fn surname(mut self, value: Option<String>) -> Self {
        self.0.surname = Some(value);
        self
    }

    #[must_use]
    pub fn nationality(mut self, value: Option<String>) -> Self {
        self.0.nationality = Some(value);
        self
    }

    #[must_use]
    pub fn mother_tongue(mut self, value: Option<String>) -> Self {
        self.0.mother_tongue = Some(value);
        self
    }

    #[must_use]
    pub fn religion(mut self, value: Option<String>) -> Self {
        self.0.religion = Some(value);
        self
    }

    #[must_use]
    pub fn caste(mut self, value: Option<String>) -> Self {
        self.0.caste = Some(value);
        self
    }

    #[must_use]
    pub fn birth_place_village(mut self, value: Option<String>) -> Self {
        self.0.birth_place_village = Some(value);
        self
    }

    #[must_use]
    pub fn birth_place_district(mut self, value: Option<String>) -> Self {
        self.0.birth_place_district = Some(value);
        self
    }

    #[must_use]
    pub fn birth_place_state(mut self, value: Option<String>) -> Self {
        self.0.birth_place_state = Some(value);
        self
    }

    #[must_use]
    pub fn date_of_birth(mut self, value: NaiveDate) -> Self {
        self.0.date_of_birth = Some(value);
        self
    }

    #[must_use]
    pub fn date_of_birth_words(mut self, value: Option<String>) -> Self {
        self.0.date_of_birth_words = Some(value);
        self
    }

    #[must_use]
    pub fn comment(mut self, value: Option<String>) -> Self {
        self.0.comment = Some(value);
        self
    }

    #[must_use]
    pub fn build(self) -> StudentUpdate {
        self.0
    }
}

impl Default for StudentUpdateBuilder {
    fn default() -> Self {
        Self::new()
    }
}
