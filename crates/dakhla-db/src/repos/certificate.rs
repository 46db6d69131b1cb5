//! Leaving certificate repository — CRUD, joined detail reads, filtered
//! listing.
//!
//! A certificate references the school being left and the student leaving it.
//! Detail reads resolve both sides' descriptive fields; that join is
//! read-only and never written back.

use chrono::Utc;
use serde::Serialize;

use dakhla_core::entities::{Certificate, CertificateDetail};
use dakhla_core::enums::{RecordKind, RecordStatus, Role, WorkflowAction};
use dakhla_core::errors::DomainError;
use dakhla_core::identity::{Actor, Origin};
use dakhla_core::ids::PREFIX_CERTIFICATE;
use dakhla_core::policy;
use dakhla_core::responses::{Page, PageMeta};

use crate::error::{DatabaseError, translate_write_error};
use crate::filters::{Pagination, SortSpec, resolve_sort_key};
use crate::helpers::{
    get_opt_string, parse_date, parse_datetime, parse_enum, parse_optional_date,
    parse_optional_datetime,
};
use crate::repos::support::require_identifier;
use crate::service::DakhlaService;
use crate::updates::certificate::CertificateUpdate;

/// Creation payload. `school_id` and `student_id` must reference existing
/// rows; at least one of `serial_no` / `general_register_ref` must be
/// non-empty.
#[derive(Debug, Clone, Default, Serialize)]
pub struct NewCertificate {
    pub school_id: String,
    pub student_id: String,
    pub serial_no: Option<String>,
    pub general_register_ref: Option<String>,
    pub previous_school: Option<String>,
    pub admission_date: Option<chrono::NaiveDate>,
    pub admission_class: Option<String>,
    pub progress_in_studies: Option<String>,
    pub conduct: Option<String>,
    pub leaving_date: Option<chrono::NaiveDate>,
    pub leaving_class: Option<String>,
    pub reason_for_leaving: Option<String>,
    pub remarks: Option<String>,
    pub certificate_date: Option<chrono::NaiveDate>,
    pub class_teacher_name: Option<String>,
    pub clerk_name: Option<String>,
    pub headmaster_name: Option<String>,
}

/// Filter criteria for certificate listings.
#[derive(Debug, Default)]
pub struct CertificateFilter {
    pub status: Option<RecordStatus>,
    pub school_id: Option<String>,
    pub student_id: Option<String>,
    /// Substring match on serial number or general register reference.
    pub search: Option<String>,
    pub leaving_after: Option<chrono::NaiveDate>,
    pub leaving_before: Option<chrono::NaiveDate>,
}

/// Columns a caller may sort certificate listings by.
pub const SORTABLE: &[&str] = &["serial_no", "leaving_date", "status", "created_at", "updated_at"];

const TABLE: &str = "certificates";

const SELECT_COLS: &str = "id, school_id, student_id, serial_no, general_register_ref, \
     previous_school, admission_date, admission_class, progress_in_studies, conduct, \
     leaving_date, leaving_class, reason_for_leaving, remarks, certificate_date, \
     class_teacher_name, clerk_name, headmaster_name, status, issued_by, issued_at, comment, \
     created_by, updated_by, created_at, updated_at";

fn row_to_certificate(row: &libsql::Row) -> Result<Certificate, DatabaseError> {
    Ok(Certificate {
        id: row.get(0)?,
        school_id: row.get(1)?,
        student_id: row.get(2)?,
        serial_no: get_opt_string(row, 3)?,
        general_register_ref: get_opt_string(row, 4)?,
        previous_school: get_opt_string(row, 5)?,
        admission_date: parse_optional_date(get_opt_string(row, 6)?.as_deref())?,
        admission_class: get_opt_string(row, 7)?,
        progress_in_studies: get_opt_string(row, 8)?,
        conduct: get_opt_string(row, 9)?,
        leaving_date: parse_optional_date(get_opt_string(row, 10)?.as_deref())?,
        leaving_class: get_opt_string(row, 11)?,
        reason_for_leaving: get_opt_string(row, 12)?,
        remarks: get_opt_string(row, 13)?,
        certificate_date: parse_optional_date(get_opt_string(row, 14)?.as_deref())?,
        class_teacher_name: get_opt_string(row, 15)?,
        clerk_name: get_opt_string(row, 16)?,
        headmaster_name: get_opt_string(row, 17)?,
        status: parse_enum(&row.get::<String>(18)?)?,
        issued_by: get_opt_string(row, 19)?,
        issued_at: parse_optional_datetime(get_opt_string(row, 20)?.as_deref())?,
        comment: get_opt_string(row, 21)?,
        created_by: get_opt_string(row, 22)?,
        updated_by: get_opt_string(row, 23)?,
        created_at: parse_datetime(&row.get::<String>(24)?)?,
        updated_at: parse_datetime(&row.get::<String>(25)?)?,
    })
}

fn identifier_pairs(new: &NewCertificate) -> [(&'static str, Option<&str>); 2] {
    [
        ("serial_no", new.serial_no.as_deref()),
        ("general_register_ref", new.general_register_ref.as_deref()),
    ]
}

impl DakhlaService {
    /// Create a certificate in `draft` for an existing school and student.
    ///
    /// # Errors
    ///
    /// `Forbidden` unless the actor is admin, `Validation` when the school
    /// or student reference is unknown or no identifier is provided,
    /// `DuplicateIdentifier` on conflicts.
    pub async fn create_certificate(
        &self,
        actor: &Actor,
        new: NewCertificate,
        origin: &Origin,
    ) -> Result<Certificate, DomainError> {
        policy::authorize(actor.role, WorkflowAction::Create, RecordStatus::Draft)?;

        // The school and student must already be registered; certificates
        // never auto-create their referents.
        if self.fetch_school(&new.school_id).await.is_err() {
            return Err(DomainError::validation(
                "school_id",
                format!("school {} not found", new.school_id),
            ));
        }
        if self.fetch_student(&new.student_id).await.is_err() {
            return Err(DomainError::validation(
                "student_id",
                format!("student {} not found", new.student_id),
            ));
        }

        require_identifier(&identifier_pairs(&new), &Certificate::IDENTIFIER_FIELDS)?;
        self.check_duplicate_identifiers(TABLE, &identifier_pairs(&new), None)
            .await?;

        let now = Utc::now();
        let id = self
            .db()
            .generate_id(PREFIX_CERTIFICATE)
            .await
            .map_err(DomainError::from)?;

        self.db()
            .conn()
            .execute(
                &format!(
                    "INSERT INTO certificates ({SELECT_COLS})
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15,
                             ?16, ?17, ?18, ?19, ?20, ?21, ?22, ?23, ?24, ?25, ?26)"
                ),
                libsql::params![
                    id.as_str(),
                    new.school_id.as_str(),
                    new.student_id.as_str(),
                    new.serial_no.as_deref().map(str::trim),
                    new.general_register_ref.as_deref().map(str::trim),
                    new.previous_school.as_deref(),
                    new.admission_date.map(|d| d.to_string()),
                    new.admission_class.as_deref(),
                    new.progress_in_studies.as_deref(),
                    new.conduct.as_deref(),
                    new.leaving_date.map(|d| d.to_string()),
                    new.leaving_class.as_deref(),
                    new.reason_for_leaving.as_deref(),
                    new.remarks.as_deref(),
                    new.certificate_date.map(|d| d.to_string()),
                    new.class_teacher_name.as_deref(),
                    new.clerk_name.as_deref(),
                    new.headmaster_name.as_deref(),
                    RecordStatus::Draft.as_str(),
                    Option::<&str>::None,
                    Option::<&str>::None,
                    Option::<&str>::None,
                    actor.id.as_str(),
                    Option::<&str>::None,
                    now.to_rfc3339(),
                    now.to_rfc3339()
                ],
            )
            .await
            .map_err(|e| translate_write_error(e, &Certificate::IDENTIFIER_FIELDS))?;

        let certificate = self.fetch_certificate(&id).await?;

        let snapshot = serde_json::to_value(&new).unwrap_or(serde_json::Value::Null);
        self.record_add(actor, TABLE, &id, origin, &snapshot).await;

        Ok(certificate)
    }

    /// Fetch by id without view rules. Internal to the service and workflow.
    pub(crate) async fn fetch_certificate(&self, id: &str) -> Result<Certificate, DomainError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!("SELECT {SELECT_COLS} FROM certificates WHERE id = ?1"),
                [id],
            )
            .await
            .map_err(DatabaseError::from)?;
        let row = rows
            .next()
            .await
            .map_err(DatabaseError::from)?
            .ok_or_else(|| DomainError::NotFound {
                entity: RecordKind::Certificate,
                id: id.to_string(),
            })?;
        Ok(row_to_certificate(&row)?)
    }

    /// Fetch a certificate with its school's and student's descriptive
    /// fields joined in, the view rule applied, and the read audited.
    ///
    /// # Errors
    ///
    /// `NotFound` when missing or not visible to the actor's role.
    pub async fn get_certificate(
        &self,
        actor: &Actor,
        id: &str,
        origin: &Origin,
    ) -> Result<CertificateDetail, DomainError> {
        let prefixed: String = SELECT_COLS
            .split(", ")
            .map(|col| format!("c.{}", col.trim()))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "SELECT {prefixed}, s.name, s.district, s.school_recognition_no, s.board, s.medium, \
             st.full_name, st.surname, st.date_of_birth, st.uid_aadhar_no
             FROM certificates c
             JOIN schools s ON c.school_id = s.id
             JOIN students st ON c.student_id = st.id
             WHERE c.id = ?1"
        );
        let mut rows = self
            .db()
            .conn()
            .query(&sql, [id])
            .await
            .map_err(DatabaseError::from)?;
        let row = rows
            .next()
            .await
            .map_err(DatabaseError::from)?
            .ok_or_else(|| DomainError::NotFound {
                entity: RecordKind::Certificate,
                id: id.to_string(),
            })?;

        let certificate = row_to_certificate(&row)?;
        if policy::authorize(actor.role, WorkflowAction::View, certificate.status).is_err() {
            return Err(DomainError::NotFound {
                entity: RecordKind::Certificate,
                id: id.to_string(),
            });
        }

        let detail = CertificateDetail {
            certificate,
            school_name: row.get(26).map_err(DatabaseError::from)?,
            school_district: get_opt_string(&row, 27)?,
            school_recognition_no: get_opt_string(&row, 28)?,
            school_board: get_opt_string(&row, 29)?,
            school_medium: get_opt_string(&row, 30)?,
            student_full_name: row.get(31).map_err(DatabaseError::from)?,
            student_surname: get_opt_string(&row, 32)?,
            student_date_of_birth: parse_date(&row.get::<String>(33).map_err(DatabaseError::from)?)?,
            student_uid_aadhar_no: get_opt_string(&row, 34)?,
        };

        self.record_view(actor, TABLE, id, origin).await;
        Ok(detail)
    }

    /// Partially update a certificate.
    ///
    /// # Errors
    ///
    /// `NotFound`, `Forbidden`, `Validation` (last identifier cleared),
    /// `DuplicateIdentifier`.
    pub async fn update_certificate(
        &self,
        actor: &Actor,
        id: &str,
        update: CertificateUpdate,
        origin: &Origin,
    ) -> Result<Certificate, DomainError> {
        let current = self.fetch_certificate(id).await?;
        policy::authorize(actor.role, WorkflowAction::Edit, current.status)?;

        let effective_serial = match &update.serial_no {
            Some(v) => v.as_deref(),
            None => current.serial_no.as_deref(),
        };
        let effective_ref = match &update.general_register_ref {
            Some(v) => v.as_deref(),
            None => current.general_register_ref.as_deref(),
        };
        require_identifier(
            &[
                ("serial_no", effective_serial),
                ("general_register_ref", effective_ref),
            ],
            &Certificate::IDENTIFIER_FIELDS,
        )?;
        self.check_duplicate_identifiers(
            TABLE,
            &[
                ("serial_no", update.serial_no.as_ref().and_then(|v| v.as_deref())),
                (
                    "general_register_ref",
                    update
                        .general_register_ref
                        .as_ref()
                        .and_then(|v| v.as_deref()),
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
        macro_rules! set_opt_date {
            ($field:ident) => {
                if let Some(ref value) = update.$field {
                    sets.push(format!(concat!(stringify!($field), " = ?{}"), idx));
                    params.push(
                        value
                            .map_or(libsql::Value::Null, |d| d.to_string().into()),
                    );
                    idx += 1;
                }
            };
        }

        set_opt!(serial_no);
        set_opt!(general_register_ref);
        set_opt!(previous_school);
        set_opt_date!(admission_date);
        set_opt!(admission_class);
        set_opt!(progress_in_studies);
        set_opt!(conduct);
        set_opt_date!(leaving_date);
        set_opt!(leaving_class);
        set_opt!(reason_for_leaving);
        set_opt!(remarks);
        set_opt_date!(certificate_date);
        set_opt!(class_teacher_name);
        set_opt!(clerk_name);
        set_opt!(headmaster_name);
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
        let sql = format!(
            "UPDATE certificates SET {} WHERE id = ?{idx}",
            sets.join(", ")
        );
        self.db()
            .conn()
            .execute(&sql, libsql::params_from_iter(params))
            .await
            .map_err(|e| translate_write_error(e, &Certificate::IDENTIFIER_FIELDS))?;

        let updated = self.fetch_certificate(id).await?;

        let old = serde_json::to_value(&current).unwrap_or(serde_json::Value::Null);
        let changed = serde_json::to_value(&update).unwrap_or(serde_json::Value::Null);
        self.record_update(actor, TABLE, id, origin, &old, &changed)
            .await;

        Ok(updated)
    }

    /// Delete a certificate. Allowed only for admin on draft/rejected
    /// records.
    ///
    /// # Errors
    ///
    /// `NotFound` or `Forbidden`.
    pub async fn delete_certificate(
        &self,
        actor: &Actor,
        id: &str,
        origin: &Origin,
    ) -> Result<Certificate, DomainError> {
        let current = self.fetch_certificate(id).await?;
        policy::authorize(actor.role, WorkflowAction::Delete, current.status)?;

        self.db()
            .conn()
            .execute("DELETE FROM certificates WHERE id = ?1", [id])
            .await
            .map_err(DatabaseError::from)?;

        self.record_delete(actor, TABLE, id, origin).await;
        Ok(current)
    }

    /// List certificates visible to the actor, filtered, sorted, and
    /// paginated.
    ///
    /// # Errors
    ///
    /// `Validation` for unknown sort keys; storage errors otherwise.
    pub async fn list_certificates(
        &self,
        actor: &Actor,
        filter: &CertificateFilter,
        page: Pagination,
        sort: &SortSpec,
    ) -> Result<Page<Certificate>, DomainError> {
        let sort_col = resolve_sort_key(sort, SORTABLE, "created_at")?;
        let (where_clause, params) = build_where(filter, actor.role);

        let total = self.count_rows(TABLE, &where_clause, params.clone()).await?;

        let sql = format!(
            "SELECT {SELECT_COLS} FROM certificates {where_clause}
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

        let mut certificates = Vec::new();
        while let Some(row) = rows.next().await.map_err(DatabaseError::from)? {
            certificates.push(row_to_certificate(&row)?);
        }

        Ok(Page {
            items: certificates,
            pagination: PageMeta::new(page.page(), page.limit(), total),
        })
    }

    /// Count certificates matching the filter under the actor's view rule.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the query fails.
    pub async fn count_certificates(
        &self,
        actor: &Actor,
        filter: &CertificateFilter,
    ) -> Result<u64, DomainError> {
        let (where_clause, params) = build_where(filter, actor.role);
        self.count_rows(TABLE, &where_clause, params).await
    }
}

fn build_where(filter: &CertificateFilter, role: Role) -> (String, Vec<libsql::Value>) {
    let mut conditions = Vec::new();
    let mut params: Vec<libsql::Value> = Vec::new();

    if role == Role::User {
        conditions.push(format!("status = '{}'", RecordStatus::Accepted.as_str()));
    }

    if let Some(status) = filter.status {
        params.push(status.as_str().into());
        conditions.push(format!("status = ?{}", params.len()));
    }
    if let Some(ref school_id) = filter.school_id {
        params.push(school_id.clone().into());
        conditions.push(format!("school_id = ?{}", params.len()));
    }
    if let Some(ref student_id) = filter.student_id {
        params.push(student_id.clone().into());
        conditions.push(format!("student_id = ?{}", params.len()));
    }
    if let Some(ref search) = filter.search {
        params.push(format!("%{search}%").into());
        let n = params.len();
        conditions.push(format!(
            "(serial_no LIKE ?{n} OR general_register_ref LIKE ?{n})"
        ));
    }
    if let Some(leaving_after) = filter.leaving_after {
        params.push(leaving_after.to_string().into());
        conditions.push(format!("leaving_date >= ?{}", params.len()));
    }
    if let Some(leaving_before) = filter.leaving_before {
        params.push(leaving_before.to_string().into());
        conditions.push(format!("leaving_date <= ?{}", params.len()));
    }

    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };
    (where_clause, params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::helpers::{
        admin_actor, new_certificate, new_school, new_student, test_service_with_users,
    };
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn create_and_get_detail_resolves_join() {
        let (svc, users) = test_service_with_users().await;
        let admin = admin_actor(&users);

        let school = svc
            .create_school(&admin, new_school("Join School", "REC-J"), &Origin::default())
            .await
            .unwrap();
        let student = svc
            .create_student(&admin, new_student("Join Student", "GR-J"), &Origin::default())
            .await
            .unwrap();

        let certificate = svc
            .create_certificate(
                &admin,
                new_certificate(&school.id, &student.id, "SER-1"),
                &Origin::default(),
            )
            .await
            .unwrap();
        assert!(certificate.id.starts_with("crt-"));

        let detail = svc
            .get_certificate(&admin, &certificate.id, &Origin::default())
            .await
            .unwrap();
        assert_eq!(detail.school_name, "Join School");
        assert_eq!(detail.student_full_name, "Join Student");
        assert_eq!(detail.certificate.serial_no.as_deref(), Some("SER-1"));
    }

    #[tokio::test]
    async fn create_rejects_unknown_referents() {
        let (svc, users) = test_service_with_users().await;
        let admin = admin_actor(&users);

        let student = svc
            .create_student(&admin, new_student("Orphan", "GR-O"), &Origin::default())
            .await
            .unwrap();

        let err = svc
            .create_certificate(
                &admin,
                new_certificate("sch-missing", &student.id, "SER-X"),
                &Origin::default(),
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "validation");
    }

    #[tokio::test]
    async fn serial_no_conflicts_across_certificates() {
        let (svc, users) = test_service_with_users().await;
        let admin = admin_actor(&users);

        let school = svc
            .create_school(&admin, new_school("S", "REC-S"), &Origin::default())
            .await
            .unwrap();
        let first = svc
            .create_student(&admin, new_student("First", "GR-F1"), &Origin::default())
            .await
            .unwrap();
        let second = svc
            .create_student(&admin, new_student("Second", "GR-F2"), &Origin::default())
            .await
            .unwrap();

        svc.create_certificate(
            &admin,
            new_certificate(&school.id, &first.id, "SER-DUP"),
            &Origin::default(),
        )
        .await
        .unwrap();
        let err = svc
            .create_certificate(
                &admin,
                new_certificate(&school.id, &second.id, "SER-DUP"),
                &Origin::default(),
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "duplicate_identifier");
    }

    #[tokio::test]
    async fn list_filters_by_school() {
        let (svc, users) = test_service_with_users().await;
        let admin = admin_actor(&users);

        let school_a = svc
            .create_school(&admin, new_school("A", "REC-LA"), &Origin::default())
            .await
            .unwrap();
        let school_b = svc
            .create_school(&admin, new_school("B", "REC-LB"), &Origin::default())
            .await
            .unwrap();
        let student = svc
            .create_student(&admin, new_student("Shared", "GR-SH"), &Origin::default())
            .await
            .unwrap();

        svc.create_certificate(
            &admin,
            new_certificate(&school_a.id, &student.id, "SER-A"),
            &Origin::default(),
        )
        .await
        .unwrap();
        svc.create_certificate(
            &admin,
            new_certificate(&school_b.id, &student.id, "SER-B"),
            &Origin::default(),
        )
        .await
        .unwrap();

        let filter = CertificateFilter {
            school_id: Some(school_a.id.clone()),
            ..Default::default()
        };
        let page = svc
            .list_certificates(&admin, &filter, Pagination::default(), &SortSpec::default())
            .await
            .unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].serial_no.as_deref(), Some("SER-A"));
        assert_eq!(svc.count_certificates(&admin, &filter).await.unwrap(), 1);
    }
}
