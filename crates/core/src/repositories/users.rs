//! User accounts: registration, credential checks and activation.

use super::helpers::{conflict_on_unique, fetch_page};
use crate::auth::{hash_password, verify_password};
use crate::constants::{MAX_USERNAME_LEN, MIN_PASSWORD_LEN};
use crate::db::Database;
use crate::models::{NewUser, User};
use crate::pagination::{Page, PageRequest};
use crate::roles::Role;
use crate::{MedicardError, MedicardResult};
use chrono::{DateTime, Utc};
use medicard_types::{EmailAddress, NonEmptyText};

#[derive(Clone, Debug)]
pub struct UserService {
    db: Database,
}

impl UserService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Register a new account. The role defaults to [`Role::User`].
    ///
    /// # Errors
    ///
    /// - `InvalidInput` if the password is shorter than [`MIN_PASSWORD_LEN`] or the username is
    ///   too long.
    /// - `Conflict` if the username or email is already registered.
    pub async fn register(&self, new: NewUser, now: DateTime<Utc>) -> MedicardResult<User> {
        if new.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(MedicardError::InvalidInput(format!(
                "password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }
        let username = NonEmptyText::with_max_len(new.username.as_str(), MAX_USERNAME_LEN)
            .map_err(|e| MedicardError::field("username", e))?;
        let password_hash = hash_password(&new.password).await?;
        let role = new.role.unwrap_or_default();

        let user = sqlx::query_as::<_, User>(
            "INSERT INTO users (username, email, password_hash, role, is_active, created_at) \
             VALUES (?, ?, ?, ?, 1, ?) RETURNING *",
        )
        .bind(username.as_str())
        .bind(new.email.as_str())
        .bind(&password_hash)
        .bind(role)
        .bind(now)
        .fetch_one(self.db.pool())
        .await
        .map_err(|e| conflict_on_unique(e, || "username or email already registered".into()))?;

        tracing::info!("registered user {} with role {}", user.id, user.role);
        Ok(user)
    }

    /// Check an email/password pair and record the login time.
    ///
    /// Unknown emails and wrong passwords both yield `InvalidCredentials`; the password is only
    /// checked against an existing account, and an inactive account is refused only after its
    /// password has been verified.
    pub async fn authenticate(
        &self,
        email: &str,
        password: &str,
        now: DateTime<Utc>,
    ) -> MedicardResult<User> {
        let Ok(email) = EmailAddress::parse(email) else {
            return Err(MedicardError::InvalidCredentials);
        };
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?")
            .bind(email.as_str())
            .fetch_optional(self.db.pool())
            .await?
            .ok_or(MedicardError::InvalidCredentials)?;

        if !verify_password(password, &user.password_hash).await? {
            return Err(MedicardError::InvalidCredentials);
        }
        if !user.is_active {
            return Err(MedicardError::InactiveAccount);
        }

        let user = sqlx::query_as::<_, User>(
            "UPDATE users SET last_login = ? WHERE id = ? RETURNING *",
        )
        .bind(now)
        .bind(user.id)
        .fetch_one(self.db.pool())
        .await?;
        Ok(user)
    }

    pub async fn find(&self, id: i64) -> MedicardResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(self.db.pool())
            .await?;
        Ok(user)
    }

    pub async fn get(&self, id: i64) -> MedicardResult<User> {
        self.find(id)
            .await?
            .ok_or_else(|| MedicardError::not_found("user", id))
    }

    pub async fn get_by_username(&self, username: &str) -> MedicardResult<User> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = ?")
            .bind(username.trim())
            .fetch_optional(self.db.pool())
            .await?
            .ok_or_else(|| MedicardError::not_found("user", username))
    }

    pub async fn set_active(&self, id: i64, active: bool) -> MedicardResult<User> {
        let user = sqlx::query_as::<_, User>("UPDATE users SET is_active = ? WHERE id = ? RETURNING *")
            .bind(active)
            .bind(id)
            .fetch_optional(self.db.pool())
            .await?
            .ok_or_else(|| MedicardError::not_found("user", id))?;
        tracing::info!("user {} active={}", id, active);
        Ok(user)
    }

    pub async fn set_role(&self, id: i64, role: Role) -> MedicardResult<User> {
        sqlx::query_as::<_, User>("UPDATE users SET role = ? WHERE id = ? RETURNING *")
            .bind(role)
            .bind(id)
            .fetch_optional(self.db.pool())
            .await?
            .ok_or_else(|| MedicardError::not_found("user", id))
    }

    pub async fn list(&self, request: PageRequest) -> MedicardResult<Page<User>> {
        fetch_page(self.db.pool(), "*", "FROM users", "username, id", request, |_| {}).await
    }
}
