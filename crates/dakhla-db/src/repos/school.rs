//! School repository — CRUD, filtered listing, identifier policy.
//!
//! Schools carry three external identifier numbers; at least one must be
//! present and each is unique among non-empty values.

use chrono::Utc;
use serde::Serialize;

use dakhla_core::entities::School;
use dakhla_core::enums::{RecordKind, RecordStatus, Role, WorkflowAction};
use dakhla_core::errors::DomainError;
use dakhla_core::identity::{Actor, Origin};
use dakhla_core::ids::PREFIX_SCHOOL;
use dakhla_core::policy;
use dakhla_core::responses::{Page, PageMeta};

use crate::error::{DatabaseError, translate_write_error};
use crate::filters::{Pagination, SortSpec, resolve_sort_key};
use crate::helpers::{get_opt_string, parse_datetime, parse_enum};
use crate::repos::support::{non_empty, require_identifier};
use crate::service::DakhlaService;
use crate::updates::school::SchoolUpdate;

/// Creation payload. `name` is required; at least one identifier number must
/// be non-empty.
#[derive(Debug, Clone, Default, Serialize)]
pub struct NewSchool {
    pub name: String,
    pub address: Option<String>,
    pub taluka: Option<String>,
    pub district: Option<String>,
    pub state: Option<String>,
    pub phone_no: Option<String>,
    pub email: Option<String>,
    pub general_register_no: Option<String>,
    pub school_recognition_no: Option<String>,
    pub udise_no: Option<String>,
    pub affiliation_no: Option<String>,
    pub board: Option<String>,
    pub medium: Option<String>,
}

/// Filter criteria for school listings.
#[derive(Debug, Default)]
pub struct SchoolFilter {
    pub status: Option<RecordStatus>,
    /// Substring match on the school name.
    pub search: Option<String>,
    pub district: Option<String>,
    pub board: Option<String>,
}

/// Columns a caller may sort school listings by.
pub const SORTABLE: &[&str] = &["name", "district", "status", "created_at", "updated_at"];

const TABLE: &str = "schools";

const SELECT_COLS: &str = "id, name, address, taluka, district, state, phone_no, email, \
     general_register_no, school_recognition_no, udise_no, affiliation_no, board, medium, \
     status, comment, created_by, updated_by, created_at, updated_at";

fn row_to_school(row: &libsql::Row) -> Result<School, DatabaseError> {
    Ok(School {
        id: row.get(0)?,
        name: row.get(1)?,
        address: get_opt_string(row, 2)?,
        taluka: get_opt_string(row, 3)?,
        district: get_opt_string(row, 4)?,
        state: get_opt_string(row, 5)?,
        phone_no: get_opt_string(row, 6)?,
        email: get_opt_string(row, 7)?,
        general_register_no: get_opt_string(row, 8)?,
        school_recognition_no: get_opt_string(row, 9)?,
        udise_no: get_opt_string(row, 10)?,
        affiliation_no: get_opt_string(row, 11)?,
        board: get_opt_string(row, 12)?,
        medium: get_opt_string(row, 13)?,
        status: parse_enum(&row.get::<String>(14)?)?,
        comment: get_opt_string(row, 15)?,
        created_by: get_opt_string(row, 16)?,
        updated_by: get_opt_string(row, 17)?,
        created_at: parse_datetime(&row.get::<String>(18)?)?,
        updated_at: parse_datetime(&row.get::<String>(19)?)?,
    })
}

fn identifier_pairs(new: &NewSchool) -> [(&'static str, Option<&str>); 3] {
    [
        ("school_recognition_no", new.school_recognition_no.as_deref()),
        ("general_register_no", new.general_register_no.as_deref()),
        ("affiliation_no", new.affiliation_no.as_deref()),
    ]
}

impl DakhlaService {
    /// Create a school record in `draft`.
    ///
    /// # Errors
    ///
    /// `Forbidden` unless the actor is admin, `Validation` when the name or
    /// every identifier is missing, `DuplicateIdentifier` on conflicts.
    pub async fn create_school(
        &self,
        actor: &Actor,
        new: NewSchool,
        origin: &Origin,
    ) -> Result<School, DomainError> {
        policy::authorize(actor.role, WorkflowAction::Create, RecordStatus::Draft)?;

        if non_empty(Some(&new.name)).is_none() {
            return Err(DomainError::validation("name", "must not be empty"));
        }
        require_identifier(&identifier_pairs(&new), &School::IDENTIFIER_FIELDS)?;
        self.check_duplicate_identifiers(TABLE, &identifier_pairs(&new), None)
            .await?;

        let now = Utc::now();
        let id = self
            .db()
            .generate_id(PREFIX_SCHOOL)
            .await
            .map_err(DomainError::from)?;

        self.db()
            .conn()
            .execute(
                &format!(
                    "INSERT INTO schools ({SELECT_COLS})
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15,
                             ?16, ?17, ?18, ?19, ?20)"
                ),
                libsql::params![
                    id.as_str(),
                    new.name.trim(),
                    new.address.as_deref(),
                    new.taluka.as_deref(),
                    new.district.as_deref(),
                    new.state.as_deref(),
                    new.phone_no.as_deref(),
                    new.email.as_deref(),
                    new.general_register_no.as_deref().map(str::trim),
                    new.school_recognition_no.as_deref().map(str::trim),
                    new.udise_no.as_deref(),
                    new.affiliation_no.as_deref().map(str::trim),
                    new.board.as_deref(),
                    new.medium.as_deref(),
                    RecordStatus::Draft.as_str(),
                    Option::<&str>::None,
                    actor.id.as_str(),
                    Option::<&str>::None,
                    now.to_rfc3339(),
                    now.to_rfc3339()
                ],
            )
            .await
            .map_err(|e| translate_write_error(e, &School::IDENTIFIER_FIELDS))?;

        let school = self.fetch_school(&id).await?;

        let snapshot = serde_json::to_value(&new).unwrap_or(serde_json::Value::Null);
        self.record_add(actor, TABLE, &id, origin, &snapshot).await;

        Ok(school)
    }

    /// Fetch by id without view rules. Internal to the service and workflow.
    pub(crate) async fn fetch_school(&self, id: &str) -> Result<School, DomainError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!("SELECT {SELECT_COLS} FROM schools WHERE id = ?1"),
                [id],
            )
            .await
            .map_err(DatabaseError::from)?;
        let row = rows
            .next()
            .await
            .map_err(DatabaseError::from)?
            .ok_or_else(|| DomainError::NotFound {
                entity: RecordKind::School,
                id: id.to_string(),
            })?;
        Ok(row_to_school(&row)?)
    }

    /// Fetch by id with the view rule applied and a `view` audit entry
    /// recorded.
    ///
    /// # Errors
    ///
    /// `NotFound` when missing or not visible to the actor's role.
    pub async fn get_school(
        &self,
        actor: &Actor,
        id: &str,
        origin: &Origin,
    ) -> Result<School, DomainError> {
        let school = self.fetch_school(id).await?;
        if policy::authorize(actor.role, WorkflowAction::View, school.status).is_err() {
            return Err(DomainError::NotFound {
                entity: RecordKind::School,
                id: id.to_string(),
            });
        }
        self.record_view(actor, TABLE, id, origin).await;
        Ok(school)
    }

    /// Partially update a school.
    ///
    /// # Errors
    ///
    /// `NotFound`, `Forbidden`, `Validation` (last identifier cleared or
    /// empty name), `DuplicateIdentifier`.
    pub async fn update_school(
        &self,
        actor: &Actor,
        id: &str,
        update: SchoolUpdate,
        origin: &Origin,
    ) -> Result<School, DomainError> {
        let current = self.fetch_school(id).await?;
        policy::authorize(actor.role, WorkflowAction::Edit, current.status)?;

        let effective = |u: &Option<Option<String>>, c: &Option<String>| match u {
            Some(v) => v.clone(),
            None => c.clone(),
        };
        let recognition = effective(&update.school_recognition_no, &current.school_recognition_no);
        let register = effective(&update.general_register_no, &current.general_register_no);
        let affiliation = effective(&update.affiliation_no, &current.affiliation_no);
        require_identifier(
            &[
                ("school_recognition_no", recognition.as_deref()),
                ("general_register_no", register.as_deref()),
                ("affiliation_no", affiliation.as_deref()),
            ],
            &School::IDENTIFIER_FIELDS,
        )?;
        self.check_duplicate_identifiers(
            TABLE,
            &[
                (
                    "school_recognition_no",
                    update
                        .school_recognition_no
                        .as_ref()
                        .and_then(|v| v.as_deref()),
                ),
                (
                    "general_register_no",
                    update.general_register_no.as_ref().and_then(|v| v.as_deref()),
                ),
                (
                    "affiliation_no",
                    update.affiliation_no.as_ref().and_then(|v| v.as_deref()),
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

        if let Some(ref name) = update.name {
            if non_empty(Some(name)).is_none() {
                return Err(DomainError::validation("name", "must not be empty"));
            }
            sets.push(format!("name = ?{idx}"));
            params.push(name.clone().into());
            idx += 1;
        }
        set_opt!(address);
        set_opt!(taluka);
        set_opt!(district);
        set_opt!(state);
        set_opt!(phone_no);
        set_opt!(email);
        set_opt!(general_register_no);
        set_opt!(school_recognition_no);
        set_opt!(udise_no);
        set_opt!(affiliation_no);
        set_opt!(board);
        set_opt!(medium);
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
        let sql = format!("UPDATE schools SET {} WHERE id = ?{idx}", sets.join(", "));
        self.db()
            .conn()
            .execute(&sql, libsql::params_from_iter(params))
            .await
            .map_err(|e| translate_write_error(e, &School::IDENTIFIER_FIELDS))?;

        let updated = self.fetch_school(id).await?;

        let old = serde_json::to_value(&current).unwrap_or(serde_json::Value::Null);
        let changed = serde_json::to_value(&update).unwrap_or(serde_json::Value::Null);
        self.record_update(actor, TABLE, id, origin, &old, &changed)
            .await;

        Ok(updated)
    }

    /// Delete a school. Allowed only for admin on draft/rejected records.
    ///
    /// # Errors
    ///
    /// `NotFound` or `Forbidden`.
    pub async fn delete_school(
        &self,
        actor: &Actor,
        id: &str,
        origin: &Origin,
    ) -> Result<School, DomainError> {
        let current = self.fetch_school(id).await?;
        policy::authorize(actor.role, WorkflowAction::Delete, current.status)?;

        self.db()
            .conn()
            .execute("DELETE FROM schools WHERE id = ?1", [id])
            .await
            .map_err(DatabaseError::from)?;

        self.record_delete(actor, TABLE, id, origin).await;
        Ok(current)
    }

    /// List schools visible to the actor, filtered, sorted, and paginated.
    ///
    /// # Errors
    ///
    /// `Validation` for unknown sort keys; storage errors otherwise.
    pub async fn list_schools(
        &self,
        actor: &Actor,
        filter: &SchoolFilter,
        page: Pagination,
        sort: &SortSpec,
    ) -> Result<Page<School>, DomainError> {
        let sort_col = resolve_sort_key(sort, SORTABLE, "name")?;
        let (where_clause, params) = build_where(filter, actor.role);

        let total = self.count_rows(TABLE, &where_clause, params.clone()).await?;

        let sql = format!(
            "SELECT {SELECT_COLS} FROM schools {where_clause}
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

        let mut schools = Vec::new();
        while let Some(row) = rows.next().await.map_err(DatabaseError::from)? {
            schools.push(row_to_school(&row)?);
        }

        Ok(Page {
            items: schools,
            pagination: PageMeta::new(page.page(), page.limit(), total),
        })
    }

    /// Count schools matching the filter under the actor's view rule.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the query fails.
    pub async fn count_schools(
        &self,
        actor: &Actor,
        filter: &SchoolFilter,
    ) -> Result<u64, DomainError> {
        let (where_clause, params) = build_where(filter, actor.role);
        self.count_rows(TABLE, &where_clause, params).await
    }
}

fn build_where(filter: &SchoolFilter, role: Role) -> (String, Vec<libsql::Value>) {
    let mut conditions = Vec::new();
    let mut params: Vec<libsql::Value> = Vec::new();

    if role == Role::User {
        conditions.push(format!("status = '{}'", RecordStatus::Accepted.as_str()));
    }

    if let Some(status) = filter.status {
        params.push(status.as_str().into());
        conditions.push(format!("status = ?{}", params.len()));
    }
    if let Some(ref search) = filter.search {
        params.push(format!("%{search}%").into());
        conditions.push(format!("name LIKE ?{}", params.len()));
    }
    if let Some(ref district) = filter.district {
        params.push(district.clone().into());
        conditions.push(format!("district = ?{}", params.len()));
    }
    if let Some(ref board) = filter.board {
        params.push(board.clone().into());
        conditions.push(format!("board = ?{}", params.len()));
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
    use crate::test_support::helpers::{admin_actor, new_school, test_service_with_users};
    use crate::updates::school::SchoolUpdateBuilder;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn create_school_roundtrip() {
        let (svc, users) = test_service_with_users().await;
        let admin = admin_actor(&users);

        let school = svc
            .create_school(&admin, new_school("Zilla Parishad School", "REC-100"), &Origin::default())
            .await
            .unwrap();
        assert!(school.id.starts_with("sch-"));
        assert_eq!(school.status, RecordStatus::Draft);
        assert_eq!(school.school_recognition_no.as_deref(), Some("REC-100"));
    }

    #[tokio::test]
    async fn any_of_the_three_identifiers_conflicts() {
        let (svc, users) = test_service_with_users().await;
        let admin = admin_actor(&users);

        let mut first = new_school("First", "REC-1");
        first.affiliation_no = Some("AFF-1".to_string());
        svc.create_school(&admin, first, &Origin::default()).await.unwrap();

        let mut second = new_school("Second", "REC-2");
        second.affiliation_no = Some("AFF-1".to_string());
        let err = svc
            .create_school(&admin, second, &Origin::default())
            .await
            .unwrap_err();
        match err {
            DomainError::DuplicateIdentifier { fields } => {
                assert_eq!(fields, vec!["affiliation_no".to_string()]);
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[tokio::test]
    async fn update_duplicate_check_excludes_self() {
        let (svc, users) = test_service_with_users().await;
        let admin = admin_actor(&users);

        let school = svc
            .create_school(&admin, new_school("Keep", "REC-10"), &Origin::default())
            .await
            .unwrap();

        // Re-asserting its own recognition number is not a conflict.
        let update = SchoolUpdateBuilder::new()
            .school_recognition_no(Some("REC-10".to_string()))
            .district(Some("Pune".to_string()))
            .build();
        let updated = svc
            .update_school(&admin, &school.id, update, &Origin::default())
            .await
            .unwrap();
        assert_eq!(updated.district.as_deref(), Some("Pune"));
        assert_eq!(updated.updated_by.as_deref(), Some(admin.id.as_str()));
    }

    #[tokio::test]
    async fn list_search_and_sort() {
        let (svc, users) = test_service_with_users().await;
        let admin = admin_actor(&users);

        svc.create_school(&admin, new_school("Modern High School", "REC-A"), &Origin::default())
            .await
            .unwrap();
        svc.create_school(&admin, new_school("New English School", "REC-B"), &Origin::default())
            .await
            .unwrap();

        let filter = SchoolFilter {
            search: Some("English".to_string()),
            ..Default::default()
        };
        let page = svc
            .list_schools(&admin, &filter, Pagination::default(), &SortSpec::default())
            .await
            .unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].name, "New English School");

        let sorted = svc
            .list_schools(
                &admin,
                &SchoolFilter::default(),
                Pagination::default(),
                &SortSpec {
                    key: Some("name".to_string()),
                    order: crate::filters::SortOrder::Asc,
                },
            )
            .await
            .unwrap();
        assert_eq!(sorted.items[0].name, "Modern High School");
    }
}
