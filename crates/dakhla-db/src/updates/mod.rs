//! Update builder types for record mutations.
//!
//! Each builder produces an update struct with `Option` fields. Only `Some`
//! fields generate SET clauses in the dynamic UPDATE SQL; double-`Option`
//! fields distinguish "leave unchanged" from "clear to NULL". The serialized
//! form (changed fields only) is diffed against the old row to produce the
//! field-level audit entries.
//!
//! None of the builders carries `status` — status changes go through the
//! workflow transition methods exclusively.

pub mod certificate;
pub mod school;
pub mod student;
