//! User account repository.
//!
//! Accounts carry identity and role only; credential handling belongs to the
//! external authentication provider. Deleting a user must not erase history:
//! the `ON DELETE SET NULL` references on `audit_log` and `status_history`
//! null the actor while the rows persist.

use chrono::Utc;

use dakhla_core::entities::User;
use dakhla_core::enums::{RecordKind, Role};
use dakhla_core::errors::DomainError;
use dakhla_core::identity::Actor;
use dakhla_core::ids::PREFIX_USER;

use crate::error::{DatabaseError, translate_write_error};
use crate::helpers::{get_opt_string, parse_datetime, parse_enum};
use crate::repos::support::non_empty;
use crate::service::DakhlaService;

const SELECT_COLS: &str = "id, username, full_name, role, active, created_at";

fn row_to_user(row: &libsql::Row) -> Result<User, DatabaseError> {
    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        full_name: get_opt_string(row, 2)?,
        role: parse_enum(&row.get::<String>(3)?)?,
        active: row.get::<i64>(4)? != 0,
        created_at: parse_datetime(&row.get::<String>(5)?)?,
    })
}

impl DakhlaService {
    /// Create a user account.
    ///
    /// # Errors
    ///
    /// `Validation` on an empty username, `DuplicateIdentifier` when the
    /// username is taken, `Storage` on other faults.
    pub async fn create_user(
        &self,
        username: &str,
        full_name: Option<&str>,
        role: Role,
    ) -> Result<User, DomainError> {
        let Some(username) = non_empty(Some(username)) else {
            return Err(DomainError::validation("username", "must not be empty"));
        };

        let now = Utc::now();
        let id = self
            .db()
            .generate_id(PREFIX_USER)
            .await
            .map_err(DomainError::from)?;

        self.db()
            .conn()
            .execute(
                &format!("INSERT INTO users ({SELECT_COLS}) VALUES (?1, ?2, ?3, ?4, 1, ?5)"),
                libsql::params![
                    id.as_str(),
                    username,
                    full_name,
                    role.as_str(),
                    now.to_rfc3339()
                ],
            )
            .await
            .map_err(|e| translate_write_error(e, &["username"]))?;

        Ok(User {
            id,
            username: username.to_string(),
            full_name: full_name.map(String::from),
            role,
            active: true,
            created_at: now,
        })
    }

    /// Fetch a user by id.
    ///
    /// # Errors
    ///
    /// `NotFound` when absent.
    pub async fn get_user(&self, id: &str) -> Result<User, DomainError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!("SELECT {SELECT_COLS} FROM users WHERE id = ?1"),
                [id],
            )
            .await
            .map_err(DatabaseError::from)?;
        let row = rows
            .next()
            .await
            .map_err(DatabaseError::from)?
            .ok_or_else(|| DomainError::NotFound {
                entity: RecordKind::User,
                id: id.to_string(),
            })?;
        Ok(row_to_user(&row)?)
    }

    /// Look up a user by username.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the query fails.
    pub async fn find_user_by_username(
        &self,
        username: &str,
    ) -> Result<Option<User>, DomainError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!("SELECT {SELECT_COLS} FROM users WHERE username = ?1"),
                [username],
            )
            .await
            .map_err(DatabaseError::from)?;
        match rows.next().await.map_err(DatabaseError::from)? {
            Some(row) => Ok(Some(row_to_user(&row)?)),
            None => Ok(None),
        }
    }

    /// All user accounts, oldest first.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the query fails.
    pub async fn list_users(&self) -> Result<Vec<User>, DomainError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!("SELECT {SELECT_COLS} FROM users ORDER BY created_at, id"),
                (),
            )
            .await
            .map_err(DatabaseError::from)?;

        let mut users = Vec::new();
        while let Some(row) = rows.next().await.map_err(DatabaseError::from)? {
            users.push(row_to_user(&row)?);
        }
        Ok(users)
    }

    /// Permanently remove a user account. Audit and history rows that
    /// reference the account survive with their actor nulled.
    ///
    /// # Errors
    ///
    /// `NotFound` when absent.
    pub async fn delete_user(&self, id: &str) -> Result<User, DomainError> {
        let user = self.get_user(id).await?;
        self.db()
            .conn()
            .execute("DELETE FROM users WHERE id = ?1", [id])
            .await
            .map_err(DatabaseError::from)?;
        Ok(user)
    }

    /// Resolve an authenticated user id into the workflow actor.
    ///
    /// # Errors
    ///
    /// `NotFound` for unknown ids, `Forbidden` for deactivated accounts.
    pub async fn resolve_actor(&self, user_id: &str) -> Result<Actor, DomainError> {
        let user = self.get_user(user_id).await?;
        if !user.active {
            return Err(DomainError::Forbidden {
                reason: format!("account {} is deactivated", user.username),
                required_role: None,
            });
        }
        Ok(Actor::new(user.id, user.role))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::helpers::test_service;

    #[tokio::test]
    async fn create_and_resolve_actor() {
        let svc = test_service().await;
        let user = svc
            .create_user("clerk1", Some("Head Clerk"), Role::Admin)
            .await
            .unwrap();
        assert!(user.id.starts_with("usr-"));

        let actor = svc.resolve_actor(&user.id).await.unwrap();
        assert_eq!(actor.role, Role::Admin);
    }

    #[tokio::test]
    async fn duplicate_username_is_rejected() {
        let svc = test_service().await;
        svc.create_user("clerk1", None, Role::Admin).await.unwrap();
        let err = svc
            .create_user("clerk1", None, Role::User)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "duplicate_identifier");
    }

    #[tokio::test]
    async fn unknown_user_is_not_found() {
        let svc = test_service().await;
        let err = svc.get_user("usr-missing").await.unwrap_err();
        assert_eq!(err.kind(), "not_found");
    }

    #[tokio::test]
    async fn delete_user_returns_the_account() {
        let svc = test_service().await;
        let user = svc.create_user("gone", None, Role::User).await.unwrap();
        let deleted = svc.delete_user(&user.id).await.unwrap();
        assert_eq!(deleted.username, "gone");
        assert_eq!(
            svc.get_user(&user.id).await.unwrap_err().kind(),
            "not_found"
        );
    }
}
