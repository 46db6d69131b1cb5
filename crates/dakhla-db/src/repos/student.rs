//! Student repository — CRUD, filtered listing, identifier policy.

use chrono::{NaiveDate, Utc};
use serde::Serialize;

use dakhla_core::entities::Student;
use dakhla_core::enums::{RecordKind, RecordStatus, Role, WorkflowAction};
use dakhla_core::errors::DomainError;
use dakhla_core::identity::{Actor, Origin};
use dakhla_core::ids::PREFIX_STUDENT;
use dakhla_core::policy;
use dakhla_core::responses::{Page, PageMeta};

use crate::error::{DatabaseError, translate_write_error};
use crate::filters::{Pagination, SortSpec, resolve_sort_key};
use crate::helpers::{get_opt_string, parse_date, parse_datetime, parse_enum};
use crate::repos::support::{non_empty, require_identifier};
use crate::service::DakhlaService;
use crate::updates::student::StudentUpdate;

/// Creation payload. `full_name` and `date_of_birth` are required; at least
/// one of `student_id` / `uid_aadhar_no` must be non-empty.
#[derive(Debug, Clone, Default, Serialize)]
pub struct NewStudent {
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
    pub date_of_birth: Option<NaiveDate>,
    pub date_of_birth_words: Option<String>,
}

/// Filter criteria for student listings.
#[derive(Debug, Default)]
pub struct StudentFilter {
    pub status: Option<RecordStatus>,
    /// Substring match on full name or surname.
    pub search: Option<String>,
    pub birth_place_district: Option<String>,
    pub born_after: Option<NaiveDate>,
    pub born_before: Option<NaiveDate>,
    pub created_by: Option<String>,
}

/// Columns a caller may sort student listings by.
pub const SORTABLE: &[&str] = &["full_name", "date_of_birth", "status", "created_at", "updated_at"];

const TABLE: &str = "students";

const SELECT_COLS: &str = "id, student_id, uid_aadhar_no, full_name, father_name, mother_name, \
     surname, nationality, mother_tongue, religion, caste, birth_place_village, \
     birth_place_district, birth_place_state, date_of_birth, date_of_birth_words, status, \
     comment, created_by, updated_by, created_at, updated_at";

fn row_to_student(row: &libsql::Row) -> Result<Student, DatabaseError> {
    Ok(Student {
        id: row.get(0)?,
        student_id: get_opt_string(row, 1)?,
        uid_aadhar_no: get_opt_string(row, 2)?,
        full_name: row.get(3)?,
        father_name: get_opt_string(row, 4)?,
        mother_name: get_opt_string(row, 5)?,
        surname: get_opt_string(row, 6)?,
        nationality: get_opt_string(row, 7)?,
        mother_tongue: get_opt_string(row, 8)?,
        religion: get_opt_string(row, 9)?,
        caste: get_opt_string(row, 10)?,
        birth_place_village: get_opt_string(row, 11)?,
        birth_place_district: get_opt_string(row, 12)?,
        birth_place_state: get_opt_string(row, 13)?,
        date_of_birth: parse_date(&row.get::<String>(14)?)?,
        date_of_birth_words: get_opt_string(row, 15)?,
        status: parse_enum(&row.get::<String>(16)?)?,
        comment: get_opt_string(row, 17)?,
        created_by: get_opt_string(row, 18)?,
        updated_by: get_opt_string(row, 19)?,
        created_at: parse_datetime(&row.get::<String>(20)?)?,
        updated_at: parse_datetime(&row.get::<String>(21)?)?,
    })
}

impl DakhlaService {
    /// Create a student record in `draft`.
    ///
    /// # Errors
    ///
    /// `Forbidden` unless the actor is admin, `Validation` on a missing
    /// name/birth date or when no identifier is provided,
    /// `DuplicateIdentifier` when an identifier value is taken.
    pub async fn create_student(
        &self,
        actor: &Actor,
        new: NewStudent,
        origin: &Origin,
    ) -> Result<Student, DomainError> {
        policy::authorize(actor.role, WorkflowAction::Create, RecordStatus::Draft)?;

        if non_empty(Some(&new.full_name)).is_none() {
            return Err(DomainError::validation("full_name", "must not be empty"));
        }
        let Some(date_of_birth) = new.date_of_birth else {
            return Err(DomainError::validation("date_of_birth", "is required"));
        };

        let identifiers = [
            ("student_id", new.student_id.as_deref()),
            ("uid_aadhar_no", new.uid_aadhar_no.as_deref()),
        ];
        require_identifier(&identifiers, &Student::IDENTIFIER_FIELDS)?;
        self.check_duplicate_identifiers(TABLE, &identifiers, None)
            .await?;

        let now = Utc::now();
        let id = self
            .db()
            .generate_id(PREFIX_STUDENT)
            .await
            .map_err(DomainError::from)?;

        self.db()
            .conn()
            .execute(
                &format!(
                    "INSERT INTO students ({SELECT_COLS})
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15,
                             ?16, ?17, ?18, ?19, ?20, ?21, ?22)"
                ),
                libsql::params![
                    id.as_str(),
                    new.student_id.as_deref().map(str::trim),
                    new.uid_aadhar_no.as_deref().map(str::trim),
                    new.full_name.trim(),
                    new.father_name.as_deref(),
                    new.mother_name.as_deref(),
                    new.surname.as_deref(),
                    new.nationality.as_deref(),
                    new.mother_tongue.as_deref(),
                    new.religion.as_deref(),
                    new.caste.as_deref(),
                    new.birth_place_village.as_deref(),
                    new.birth_place_district.as_deref(),
                    new.birth_place_state.as_deref(),
                    date_of_birth.to_string(),
                    new.date_of_birth_words.as_deref(),
                    RecordStatus::Draft.as_str(),
                    Option::<&str>::None,
                    actor.id.as_str(),
                    Option::<&str>::None,
                    now.to_rfc3339(),
                    now.to_rfc3339()
                ],
            )
            .await
            .map_err(|e| translate_write_error(e, &Student::IDENTIFIER_FIELDS))?;

        let student = self.fetch_student(&id).await?;

        let snapshot = serde_json::to_value(&new).unwrap_or(serde_json::Value::Null);
        self.record_add(actor, TABLE, &id, origin, &snapshot).await;

        Ok(student)
    }

    /// Fetch by id without view rules. Internal to the service and workflow.
    pub(crate) async fn fetch_student(&self, id: &str) -> Result<Student, DomainError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!("SELECT {SELECT_COLS} FROM students WHERE id = ?1"),
                [id],
            )
            .await
            .map_err(DatabaseError::from)?;
        let row = rows
            .next()
            .await
            .map_err(DatabaseError::from)?
            .ok_or_else(|| DomainError::NotFound {
                entity: RecordKind::Student,
                id: id.to_string(),
            })?;
        Ok(row_to_student(&row)?)
    }

    /// Fetch by id with the view rule applied and a `view` audit entry
    /// recorded. A record invisible to the actor reads as absent.
    ///
    /// # Errors
    ///
    /// `NotFound` when missing or not visible to the actor's role.
    pub async fn get_student(
        &self,
        actor: &Actor,
        id: &str,
        origin: &Origin,
    ) -> Result<Student, DomainError> {
        let student = self.fetch_student(id).await?;
        if policy::authorize(actor.role, WorkflowAction::View, student.status).is_err() {
            return Err(DomainError::NotFound {
                entity: RecordKind::Student,
                id: id.to_string(),
            });
        }
        self.record_view(actor, TABLE, id, origin).await;
        Ok(student)
    }

    /// Partially update a student. Only fields present in `update` change;
    /// each changed field becomes one audit row.
    ///
    /// # Errors
    ///
    /// `NotFound`, `Forbidden` (role/state), `Validation` when the update
    /// would clear the last identifier, `DuplicateIdentifier` on conflicts.
    pub async fn update_student(
        &self,
        actor: &Actor,
        id: &str,
        update: StudentUpdate,
        origin: &Origin,
    ) -> Result<Student, DomainError> {
        let current = self.fetch_student(id).await?;
        policy::authorize(actor.role, WorkflowAction::Edit, current.status)?;

        // An identifier can never be fully removed once present.
        let effective_student_id = match &update.student_id {
            Some(v) => v.as_deref(),
            None => current.student_id.as_deref(),
        };
        let effective_aadhar = match &update.uid_aadhar_no {
            Some(v) => v.as_deref(),
            None => current.uid_aadhar_no.as_deref(),
        };
        require_identifier(
            &[
                ("student_id", effective_student_id),
                ("uid_aadhar_no", effective_aadhar),
            ],
            &Student::IDENTIFIER_FIELDS,
        )?;
        self.check_duplicate_identifiers(
            TABLE,
            &[
                ("student_id", update.student_id.as_ref().and_then(|v| v.as_deref())),
                (
                    "uid_aadhar_no",
                    update.uid_aadhar_no.as_ref().and_then(|v| v.as_deref()),
                ),
            ],
            Some(id),
        )
        .await?;

        let mut sets = Vec::new();
        let mut params: Vec<libsql::Value> = Vec::new();
        let mut idx = 1usize;

        macro_rules! set_opt {
            ($field:ident) => {
                if let Some(ref value) = update.$field {
                    sets.push(format!(concat!(stringify!($field), " = ?{}"), idx));
                    params.push(value.clone().map_or(libsql::Value::Null, Into::into));
                    idx += 1;
                }
            };
        }

        set_opt!(student_id);
        set_opt!(uid_aadhar_no);
        if let Some(ref full_name) = update.full_name {
            if non_empty(Some(full_name)).is_none() {
                return Err(DomainError::validation("full_name", "must not be empty"));
            }
            sets.push(format!("full_name = ?{idx}"));
            params.push(full_name.clone().into());
            idx += 1;
        }
        set_opt!(father_name);
        set_opt!(mother_name);
        set_opt!(surname);
        set_opt!(nationality);
        set_opt!(mother_tongue);
        set_opt!(religion);
        set_opt!(caste);
        set_opt!(birth_place_village);
        set_opt!(birth_place_district);
        set_opt!(birth_place_state);
        if let Some(date_of_birth) = update.date_of_birth {
            sets.push(format!("date_of_birth = ?{idx}"));
            params.push(date_of_birth.to_string().into());
            idx += 1;
        }
        set_opt!(date_of_birth_words);
        set_opt!(comment);

        if sets.is_empty() {
            return Ok(current);
        }

        sets.push(format!("updated_by = ?{idx}"));
        params.push(actor.id.clone().into());
        idx += 1;
        sets.push(format!("updated_at = ?{idx}"));
        params.push(Utc::now().to_rfc3339().into());
        idx += 1;

        params.push(id.into());
        let sql = format!("UPDATE students SET {} WHERE id = ?{idx}", sets.join(", "));
        self.db()
            .conn()
            .execute(&sql, libsql::params_from_iter(params))
            .await
            .map_err(|e| translate_write_error(e, &Student::IDENTIFIER_FIELDS))?;

        let updated = self.fetch_student(id).await?;

        let old = serde_json::to_value(&current).unwrap_or(serde_json::Value::Null);
        let changed = serde_json::to_value(&update).unwrap_or(serde_json::Value::Null);
        self.record_update(actor, TABLE, id, origin, &old, &changed)
            .await;

        Ok(updated)
    }

    /// Delete a student. Allowed only for admin on draft/rejected records.
    ///
    /// # Errors
    ///
    /// `NotFound` or `Forbidden`.
    pub async fn delete_student(
        &self,
        actor: &Actor,
        id: &str,
        origin: &Origin,
    ) -> Result<Student, DomainError> {
        let current = self.fetch_student(id).await?;
        policy::authorize(actor.role, WorkflowAction::Delete, current.status)?;

        self.db()
            .conn()
            .execute("DELETE FROM students WHERE id = ?1", [id])
            .await
            .map_err(DatabaseError::from)?;

        self.record_delete(actor, TABLE, id, origin).await;
        Ok(current)
    }

    /// List students visible to the actor, filtered, sorted, and paginated.
    ///
    /// # Errors
    ///
    /// `Validation` for unknown sort keys; storage errors otherwise.
    pub async fn list_students(
        &self,
        actor: &Actor,
        filter: &StudentFilter,
        page: Pagination,
        sort: &SortSpec,
    ) -> Result<Page<Student>, DomainError> {
        let sort_col = resolve_sort_key(sort, SORTABLE, "created_at")?;
        let (where_clause, params) = build_where(filter, actor.role);

        let total = self.count_rows(TABLE, &where_clause, params.clone()).await?;

        let sql = format!(
            "SELECT {SELECT_COLS} FROM students {where_clause}
             ORDER BY {sort_col} {}, id LIMIT {} OFFSET {}",
            sort.order.as_sql(),
            page.limit(),
            page.offset()
        );
        let mut rows = self
            .db()
            .conn()
            .query(&sql, libsql::params_from_iter(params))
            .await
            .map_err(DatabaseError::from)?;

        let mut students = Vec::new();
        while let Some(row) = rows.next().await.map_err(DatabaseError::from)? {
            students.push(row_to_student(&row)?);
        }

        Ok(Page {
            items: students,
            pagination: PageMeta::new(page.page(), page.limit(), total),
        })
    }

    /// Count students matching the filter under the actor's view rule.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the query fails.
    pub async fn count_students(
        &self,
        actor: &Actor,
        filter: &StudentFilter,
    ) -> Result<u64, DomainError> {
        let (where_clause, params) = build_where(filter, actor.role);
        self.count_rows(TABLE, &where_clause, params).await
    }

}

fn build_where(filter: &StudentFilter, role: Role) -> (String, Vec<libsql::Value>) {
    let mut conditions = Vec::new();
    let mut params: Vec<libsql::Value> = Vec::new();

    // The view rule is pushed into SQL so non-visible rows never leave the
    // storage layer.
    if role == Role::User {
        conditions.push(format!("status = '{}'", RecordStatus::Accepted.as_str()));
    }

    if let Some(status) = filter.status {
        params.push(status.as_str().into());
        conditions.push(format!("status = ?{}", params.len()));
    }
    if let Some(ref search) = filter.search {
        params.push(format!("%{search}%").into());
        let n = params.len();
        conditions.push(format!("(full_name LIKE ?{n} OR surname LIKE ?{n})"));
    }
    if let Some(ref district) = filter.birth_place_district {
        params.push(district.clone().into());
        conditions.push(format!("birth_place_district = ?{}", params.len()));
    }
    if let Some(born_after) = filter.born_after {
        params.push(born_after.to_string().into());
        conditions.push(format!("date_of_birth >= ?{}", params.len()));
    }
    if let Some(born_before) = filter.born_before {
        params.push(born_before.to_string().into());
        conditions.push(format!("date_of_birth <= ?{}", params.len()));
    }
    if let Some(ref created_by) = filter.created_by {
        params.push(created_by.clone().into());
        conditions.push(format!("created_by = ?{}", params.len()));
    }

    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };
    (where_clause, params)
}
