//! Entity structs for all Dakhla domain objects.
//!
//! Each entity maps to a table in the libSQL database. All structs derive
//! `Serialize`, `Deserialize`, and `JsonSchema` for JSON roundtrip and schema
//! generation. Record kinds implement [`crate::policy::HasStatus`].

mod audit;
mod certificate;
mod history;
mod school;
mod student;
mod user;

pub use audit::AuditEntry;
pub use certificate::{Certificate, CertificateDetail};
pub use history::StatusHistoryEntry;
pub use school::School;
pub use student::Student;
pub use user::User;
