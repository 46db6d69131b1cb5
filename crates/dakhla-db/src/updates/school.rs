//! School update builder.

use serde::Serialize;

#[derive(Debug, Clone, Default, Serialize)]
pub struct SchoolUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub taluka: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub district: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_no: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub general_register_no: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub school_recognition_no: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub udise_no: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub affiliation_no: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub board: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub medium: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<Option<String>>,
}

pub struct SchoolUpdateBuilder(SchoolUpdate);

impl SchoolUpdateBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self(SchoolUpdate::default())
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.0.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn address(mut self, address: Option<String>) -> Self {
        self.0.address = Some(address);
        self
    }

    #[must_use]
    pub fn taluka(mut self, taluka: Option<String>) -> Self {
        self.0.taluka = Some(taluka);
        self
    }

    #[must_use]
    pub fn district(mut self, district: Option<String>) -> Self {
        self.0.district = Some(district);
        self
    }

    #[must_use]
    pub fn state(mut self, state: Option<String>) -> Self {
        self.0.state = Some(state);
        self
    }

    #[must_use]
    pub fn phone_no(mut self, phone_no: Option<String>) -> Self {
        self.0.phone_no = Some(phone_no);
        self
    }

    #[must_use]
    pub fn email(mut self, email: Option<String>) -> Self {
        self.0.email = Some(email);
        self
    }

    #[must_use]
    pub fn general_register_no(mut self, value: Option<String>) -> Self {
        self.0.general_register_no = Some(value);
        self
    }

    #[must_use]
    pub fn school_recognition_no(mut self, value: Option<String>) -> Self {
        self.0.school_recognition_no = Some(value);
        self
    }

    #[must_use]
    pub fn udise_no(mut self, value: Option<String>) -> Self {
        self.0.udise_no = Some(value);
        self
    }

    #[must_use]
    pub fn affiliation_no(mut self, value: Option<String>) -> Self {
        self.0.affiliation_no = Some(value);
        self
    }

    #[must_use]
    pub fn board(mut self, board: Option<String>) -> Self {
        self.0.board = Some(board);
        self
    }

    #[must_use]
    pub fn medium(mut self, medium: Option<String>) -> Self {
        self.0.medium = Some(medium);
        self
    }

    #[must_use]
    pub fn comment(mut self, comment: Option<String>) -> Self {
        self.0.comment = Some(comment);
        self
    }

    #[must_use]
    pub fn build(self) -> SchoolUpdate {
        self.0
    }
}

impl Default for SchoolUpdateBuilder {
    fn default() -> Self {
        Self::new()
    }
}
