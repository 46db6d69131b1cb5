//! ID prefix constants.
//!
//! Every row carries a text ID of the form `<prefix>-<8 hex chars>`,
//! generated in SQL via `randomblob(4)`.

pub const PREFIX_SCHOOL: &str = "sch";
pub const PREFIX_STUDENT: &str = "stu";
pub const PREFIX_CERTIFICATE: &str = "crt";
pub const PREFIX_USER: &str = "usr";
pub const PREFIX_AUDIT: &str = "aud";
pub const PREFIX_HISTORY: &str = "hst";

/// All prefixes, for exhaustive generation tests.
pub const ALL_PREFIXES: [&str; 6] = [
    PREFIX_SCHOOL,
    PREFIX_STUDENT,
    PREFIX_CERTIFICATE,
    PREFIX_USER,
    PREFIX_AUDIT,
    PREFIX_HISTORY,
];
