//! Top-level CLI parser for the `dkl` binary.

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use dakhla_core::enums::{AuditAction, RecordStatus, Role};

/// Parse an enum flag through its snake_case serde form, so the CLI accepts
/// exactly the values the storage layer uses (`in_review`, `super`, ...).
fn parse_snake_case<T: serde::de::DeserializeOwned>(s: &str) -> Result<T, String> {
    serde_json::from_value(serde_json::Value::String(s.to_string()))
        .map_err(|_| format!("unknown value '{s}'"))
}

fn parse_status(s: &str) -> Result<RecordStatus, String> {
    parse_snake_case(s)
}

fn parse_role(s: &str) -> Result<Role, String> {
    parse_snake_case(s)
}

fn parse_audit_action(s: &str) -> Result<AuditAction, String> {
    parse_snake_case(s)
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| format!("expected YYYY-MM-DD: {e}"))
}

#[derive(Debug, Parser)]
#[command(
    name = "dkl",
    version,
    about = "Dakhla - school-leaving certificate register"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Acting user id (resolved to a role against the users table)
    #[arg(short, long, global = true)]
    pub actor: Option<String>,

    /// Database path (overrides configuration)
    #[arg(long, global = true)]
    pub db: Option<String>,

    /// Quiet mode (suppress non-essential output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

impl Cli {
    /// Extract ergonomic global flags struct for command handlers.
    #[must_use]
    pub fn global_flags(&self) -> GlobalFlags {
        GlobalFlags {
            actor: self.actor.clone(),
            db: self.db.clone(),
            quiet: self.quiet,
            verbose: self.verbose,
        }
    }
}

/// Global flags available before or after subcommands.
#[derive(Clone, Debug)]
pub struct GlobalFlags {
    pub actor: Option<String>,
    pub db: Option<String>,
    pub quiet: bool,
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Scaffold .dakhla/config.toml in the current directory
    Init,
    /// Manage user accounts
    User {
        #[command(subcommand)]
        action: UserAction,
    },
    /// Manage school records
    School {
        #[command(subcommand)]
        action: SchoolAction,
    },
    /// Manage student records
    Student {
        #[command(subcommand)]
        action: StudentAction,
    },
    /// Manage leaving certificates
    Certificate {
        #[command(subcommand)]
        action: CertificateAction,
    },
    /// Query the audit log
    Audit(AuditArgs),
    /// Record a login for the acting user
    Login(LoginArgs),
    /// Record a logout for the acting user
    Logout,
}

// ---------------------------------------------------------------------------
// Shared args
// ---------------------------------------------------------------------------

/// Pagination and sorting, shared by every list command.
#[derive(Debug, Args)]
pub struct ListArgs {
    #[arg(long, default_value_t = 1)]
    pub page: u32,
    /// Page size (defaults to general.default_limit from configuration)
    #[arg(long)]
    pub limit: Option<u32>,
    /// Sort column (allow-listed per record kind)
    #[arg(long)]
    pub sort_by: Option<String>,
    /// Sort descending instead of ascending
    #[arg(long)]
    pub desc: bool,
}

/// Transition arguments shared by every record kind.
#[derive(Debug, Args)]
pub struct TransitionArgs {
    pub id: String,
    /// Target status
    #[arg(long, value_parser = parse_status)]
    pub to: RecordStatus,
    /// Reason recorded in the status history
    #[arg(long)]
    pub reason: Option<String>,
    /// Comment stored on the record and in the history note
    #[arg(long)]
    pub comment: Option<String>,
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[derive(Debug, Subcommand)]
pub enum UserAction {
    /// Create a user account
    Create {
        username: String,
        #[arg(long)]
        full_name: Option<String>,
        #[arg(long, value_parser = parse_role, default_value = "user")]
        role: Role,
    },
    /// List user accounts
    List,
    /// Permanently delete a user account (audit rows survive, actor nulled)
    Delete { id: String },
}

// ---------------------------------------------------------------------------
// Schools
// ---------------------------------------------------------------------------

#[derive(Debug, Args)]
pub struct SchoolCreateArgs {
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub address: Option<String>,
    #[arg(long)]
    pub taluka: Option<String>,
    #[arg(long)]
    pub district: Option<String>,
    #[arg(long)]
    pub state: Option<String>,
    #[arg(long)]
    pub phone_no: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub general_register_no: Option<String>,
    #[arg(long)]
    pub school_recognition_no: Option<String>,
    #[arg(long)]
    pub udise_no: Option<String>,
    #[arg(long)]
    pub affiliation_no: Option<String>,
    #[arg(long)]
    pub board: Option<String>,
    #[arg(long)]
    pub medium: Option<String>,
}

/// Update flags. Passing an empty string clears the field.
#[derive(Debug, Args)]
pub struct SchoolUpdateArgs {
    pub id: String,
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub address: Option<String>,
    #[arg(long)]
    pub taluka: Option<String>,
    #[arg(long)]
    pub district: Option<String>,
    #[arg(long)]
    pub state: Option<String>,
    #[arg(long)]
    pub phone_no: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub general_register_no: Option<String>,
    #[arg(long)]
    pub school_recognition_no: Option<String>,
    #[arg(long)]
    pub udise_no: Option<String>,
    #[arg(long)]
    pub affiliation_no: Option<String>,
    #[arg(long)]
    pub board: Option<String>,
    #[arg(long)]
    pub medium: Option<String>,
    #[arg(long)]
    pub comment: Option<String>,
}

#[derive(Debug, Args)]
pub struct SchoolListArgs {
    #[command(flatten)]
    pub list: ListArgs,
    #[arg(long, value_parser = parse_status)]
    pub status: Option<RecordStatus>,
    /// Substring match on the school name
    #[arg(long)]
    pub search: Option<String>,
    #[arg(long)]
    pub district: Option<String>,
    #[arg(long)]
    pub board: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum SchoolAction {
    Create(SchoolCreateArgs),
    Get { id: String },
    List(SchoolListArgs),
    Update(SchoolUpdateArgs),
    Delete { id: String },
    /// Change the workflow status
    Transition(TransitionArgs),
    /// Show allowed transitions for the record
    Transitions { id: String },
    /// Show the status history of the record
    History { id: String },
}

// ---------------------------------------------------------------------------
// Students
// ---------------------------------------------------------------------------

#[derive(Debug, Args)]
pub struct StudentCreateArgs {
    #[arg(long)]
    pub full_name: String,
    #[arg(long)]
    pub student_id: Option<String>,
    #[arg(long)]
    pub uid_aadhar_no: Option<String>,
    #[arg(long)]
    pub father_name: Option<String>,
    #[arg(long)]
    pub mother_name: Option<String>,
    #[arg(long)]
    pub surname: Option<String>,
    #[arg(long)]
    pub nationality: Option<String>,
    #[arg(long)]
    pub mother_tongue: Option<String>,
    #[arg(long)]
    pub religion: Option<String>,
    #[arg(long)]
    pub caste: Option<String>,
    #[arg(long)]
    pub birth_place_village: Option<String>,
    #[arg(long)]
    pub birth_place_district: Option<String>,
    #[arg(long)]
    pub birth_place_state: Option<String>,
    #[arg(long, value_parser = parse_date)]
    pub date_of_birth: NaiveDate,
    #[arg(long)]
    pub date_of_birth_words: Option<String>,
}

/// Update flags. Passing an empty string clears the field.
#[derive(Debug, Args)]
pub struct StudentUpdateArgs {
    pub id: String,
    #[arg(long)]
    pub full_name: Option<String>,
    #[arg(long)]
    pub student_id: Option<String>,
    #[arg(long)]
    pub uid_aadhar_no: Option<String>,
    #[arg(long)]
    pub father_name: Option<String>,
    #[arg(long)]
    pub mother_name: Option<String>,
    #[arg(long)]
    pub surname: Option<String>,
    #[arg(long)]
    pub nationality: Option<String>,
    #[arg(long)]
    pub mother_tongue: Option<String>,
    #[arg(long)]
    pub religion: Option<String>,
    #[arg(long)]
    pub caste: Option<String>,
    #[arg(long)]
    pub birth_place_village: Option<String>,
    #[arg(long)]
    pub birth_place_district: Option<String>,
    #[arg(long)]
    pub birth_place_state: Option<String>,
    #[arg(long, value_parser = parse_date)]
    pub date_of_birth: Option<NaiveDate>,
    #[arg(long)]
    pub date_of_birth_words: Option<String>,
    #[arg(long)]
    pub comment: Option<String>,
}

#[derive(Debug, Args)]
pub struct StudentListArgs {
    #[command(flatten)]
    pub list: ListArgs,
    #[arg(long, value_parser = parse_status)]
    pub status: Option<RecordStatus>,
    /// Substring match on full name or surname
    #[arg(long)]
    pub search: Option<String>,
    #[arg(long)]
    pub birth_place_district: Option<String>,
    #[arg(long, value_parser = parse_date)]
    pub born_after: Option<NaiveDate>,
    #[arg(long, value_parser = parse_date)]
    pub born_before: Option<NaiveDate>,
}

#[derive(Debug, Subcommand)]
pub enum StudentAction {
    Create(StudentCreateArgs),
    Get { id: String },
    List(StudentListArgs),
    Update(StudentUpdateArgs),
    Delete { id: String },
    /// Change the workflow status
    Transition(TransitionArgs),
    /// Show allowed transitions for the record
    Transitions { id: String },
    /// Show the status history of the record
    History { id: String },
}

// ---------------------------------------------------------------------------
// Certificates
// ---------------------------------------------------------------------------

#[derive(Debug, Args)]
pub struct CertificateCreateArgs {
    #[arg(long)]
    pub school_id: String,
    #[arg(long)]
    pub student_id: String,
    #[arg(long)]
    pub serial_no: Option<String>,
    #[arg(long)]
    pub general_register_ref: Option<String>,
    #[arg(long)]
    pub previous_school: Option<String>,
    #[arg(long, value_parser = parse_date)]
    pub admission_date: Option<NaiveDate>,
    #[arg(long)]
    pub admission_class: Option<String>,
    #[arg(long)]
    pub progress_in_studies: Option<String>,
    #[arg(long)]
    pub conduct: Option<String>,
    #[arg(long, value_parser = parse_date)]
    pub leaving_date: Option<NaiveDate>,
    #[arg(long)]
    pub leaving_class: Option<String>,
    #[arg(long)]
    pub reason_for_leaving: Option<String>,
    #[arg(long)]
    pub remarks: Option<String>,
    #[arg(long, value_parser = parse_date)]
    pub certificate_date: Option<NaiveDate>,
    #[arg(long)]
    pub class_teacher_name: Option<String>,
    #[arg(long)]
    pub clerk_name: Option<String>,
    #[arg(long)]
    pub headmaster_name: Option<String>,
}

/// Update flags. Passing an empty string clears the field.
#[derive(Debug, Args)]
pub struct CertificateUpdateArgs {
    pub id: String,
    #[arg(long)]
    pub serial_no: Option<String>,
    #[arg(long)]
    pub general_register_ref: Option<String>,
    #[arg(long)]
    pub previous_school: Option<String>,
    #[arg(long)]
    pub admission_class: Option<String>,
    #[arg(long)]
    pub progress_in_studies: Option<String>,
    #[arg(long)]
    pub conduct: Option<String>,
    #[arg(long, value_parser = parse_date)]
    pub leaving_date: Option<NaiveDate>,
    #[arg(long)]
    pub leaving_class: Option<String>,
    #[arg(long)]
    pub reason_for_leaving: Option<String>,
    #[arg(long)]
    pub remarks: Option<String>,
    #[arg(long, value_parser = parse_date)]
    pub certificate_date: Option<NaiveDate>,
    #[arg(long)]
    pub class_teacher_name: Option<String>,
    #[arg(long)]
    pub clerk_name: Option<String>,
    #[arg(long)]
    pub headmaster_name: Option<String>,
    #[arg(long)]
    pub comment: Option<String>,
}

#[derive(Debug, Args)]
pub struct CertificateListArgs {
    #[command(flatten)]
    pub list: ListArgs,
    #[arg(long, value_parser = parse_status)]
    pub status: Option<RecordStatus>,
    #[arg(long)]
    pub school_id: Option<String>,
    #[arg(long)]
    pub student_id: Option<String>,
    /// Substring match on serial number or register reference
    #[arg(long)]
    pub search: Option<String>,
    #[arg(long, value_parser = parse_date)]
    pub leaving_after: Option<NaiveDate>,
    #[arg(long, value_parser = parse_date)]
    pub leaving_before: Option<NaiveDate>,
}

#[derive(Debug, Subcommand)]
pub enum CertificateAction {
    Create(CertificateCreateArgs),
    Get { id: String },
    List(CertificateListArgs),
    Update(CertificateUpdateArgs),
    Delete { id: String },
    /// Change the workflow status
    Transition(TransitionArgs),
    /// Show allowed transitions for the record
    Transitions { id: String },
    /// Show the status history of the record
    History { id: String },
}

// ---------------------------------------------------------------------------
// Audit & session
// ---------------------------------------------------------------------------

#[derive(Debug, Args)]
pub struct AuditArgs {
    #[command(flatten)]
    pub list: ListArgs,
    /// Table name (schools, students, certificates, users)
    #[arg(long)]
    pub table: Option<String>,
    #[arg(long)]
    pub record: Option<String>,
    /// Filter by acting user id
    #[arg(long)]
    pub changed_by: Option<String>,
    #[arg(long, value_parser = parse_audit_action)]
    pub action: Option<AuditAction>,
    /// Inclusive lower bound, RFC 3339
    #[arg(long)]
    pub from: Option<String>,
    /// Inclusive upper bound, RFC 3339
    #[arg(long)]
    pub to: Option<String>,
}

#[derive(Debug, Args)]
pub struct LoginArgs {
    /// Authentication method reported by the auth provider
    #[arg(long, default_value = "password")]
    pub method: String,
}
