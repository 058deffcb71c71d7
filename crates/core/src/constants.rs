//! Constants used throughout the MEDICARD core crate.
//!
//! Defaults for configuration, pagination bounds and the fixed clinical time windows live
//! here so the REST layer, the CLI and the tests agree on them.

/// Store location used when `DATABASE_URL` is not set.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://medicard.db";

/// Trailing window, in hours, for the lab, imaging and vital-sign dashboard indicators.
pub const DEFAULT_INDICATOR_WINDOW_HOURS: i64 = 48;

/// A patient counts as a new admission if admitted within this many hours.
pub const NEW_ADMISSION_WINDOW_HOURS: i64 = 24;

/// Page size used when a list request does not specify one.
pub const DEFAULT_PAGE_SIZE: i64 = 20;

/// Upper bound on any page size; larger requests are capped to this value.
pub const MAX_PAGE_SIZE: i64 = 100;

/// Lifetime of an access token, in seconds, when `JWT_ACCESS_TOKEN_EXPIRES` is not set.
pub const DEFAULT_TOKEN_TTL_SECS: i64 = 24 * 3600;

/// Minimum accepted length, in bytes, for the token signing secret.
pub const MIN_JWT_SECRET_LEN: usize = 16;

/// Minimum accepted password length, in characters.
pub const MIN_PASSWORD_LEN: usize = 8;

/// Maximum username length, matching the `users.username` column.
pub const MAX_USERNAME_LEN: usize = 80;
