use crate::roles::Role;
use chrono::{DateTime, Utc};
use medicard_types::{EmailAddress, NonEmptyText};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// A user account. The password hash is loaded for verification but never serialised.
#[derive(Debug, Clone, Serialize, ToSchema, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(skip)]
    pub password_hash: String,
    pub role: Role,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

/// Body of `POST /api/auth/register`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct NewUser {
    #[schema(value_type = String, example = "dr.house")]
    pub username: NonEmptyText,
    #[schema(value_type = String, example = "house@example.org")]
    pub email: EmailAddress,
    #[schema(min_length = 8)]
    pub password: String,
    #[serde(default)]
    pub role: Option<Role>,
}
