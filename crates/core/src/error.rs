use medicard_types::TextError;

#[derive(Debug, thiserror::Error)]
pub enum MedicardError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("{entity} {key} not found")]
    NotFound { entity: &'static str, key: String },
    #[error("{0}")]
    Conflict(String),

    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("user account is inactive")]
    InactiveAccount,
    #[error("authentication required: {0}")]
    Unauthenticated(String),
    #[error("forbidden: {0}")]
    Forbidden(String),
    #[error("invalid access token: {0}")]
    InvalidToken(jsonwebtoken::errors::Error),
    #[error("failed to issue access token: {0}")]
    TokenIssue(jsonwebtoken::errors::Error),
    #[error("failed to hash or verify password: {0}")]
    PasswordHash(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("failed to run migrations: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl MedicardError {
    pub fn not_found(entity: &'static str, key: impl ToString) -> Self {
        Self::NotFound {
            entity,
            key: key.to_string(),
        }
    }

    /// Prefixes a validation failure with the name of the offending field.
    pub fn field(field: &str, err: TextError) -> Self {
        Self::InvalidInput(format!("{field}: {err}"))
    }
}

impl From<TextError> for MedicardError {
    fn from(err: TextError) -> Self {
        Self::InvalidInput(err.to_string())
    }
}

pub type MedicardResult<T> = std::result::Result<T, MedicardError>;
