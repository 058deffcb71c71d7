//! Core runtime configuration.
//!
//! This module defines configuration that should be resolved once at process startup and then
//! passed into core services. Request handling never reads process-wide environment variables;
//! the binaries read them, feed the raw values through the parsers below and hand the resulting
//! `CoreConfig` to the services.

use crate::constants::{
    DEFAULT_INDICATOR_WINDOW_HOURS, DEFAULT_TOKEN_TTL_SECS, MIN_JWT_SECRET_LEN,
    NEW_ADMISSION_WINDOW_HOURS,
};
use crate::{MedicardError, MedicardResult};
use chrono::Duration;

/// Core configuration resolved at startup.
#[derive(Clone)]
pub struct CoreConfig {
    jwt_secret: String,
    token_ttl: Duration,
    indicator_window: Duration,
}

impl std::fmt::Debug for CoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoreConfig")
            .field("jwt_secret", &"<redacted>")
            .field("token_ttl", &self.token_ttl)
            .field("indicator_window", &self.indicator_window)
            .finish()
    }
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// # Errors
    ///
    /// Returns `MedicardError::Config` if the secret is shorter than
    /// [`MIN_JWT_SECRET_LEN`] or either duration is not positive.
    pub fn new(
        jwt_secret: String,
        token_ttl: Duration,
        indicator_window: Duration,
    ) -> MedicardResult<Self> {
        if jwt_secret.len() < MIN_JWT_SECRET_LEN {
            return Err(MedicardError::Config(format!(
                "JWT_SECRET_KEY must be at least {MIN_JWT_SECRET_LEN} bytes"
            )));
        }
        if token_ttl <= Duration::zero() {
            return Err(MedicardError::Config(
                "token lifetime must be positive".into(),
            ));
        }
        if indicator_window <= Duration::zero() {
            return Err(MedicardError::Config(
                "indicator window must be positive".into(),
            ));
        }

        Ok(Self {
            jwt_secret,
            token_ttl,
            indicator_window,
        })
    }

    /// Build a config from the raw values of `JWT_SECRET_KEY`, `JWT_ACCESS_TOKEN_EXPIRES` and
    /// `MEDICARD_INDICATOR_WINDOW_HOURS`.
    pub fn from_env_values(
        jwt_secret: Option<String>,
        token_ttl: Option<String>,
        indicator_window: Option<String>,
    ) -> MedicardResult<Self> {
        Self::new(
            jwt_secret_from_env_value(jwt_secret)?,
            token_ttl_from_env_value(token_ttl)?,
            indicator_window_from_env_value(indicator_window)?,
        )
    }

    pub fn jwt_secret(&self) -> &str {
        &self.jwt_secret
    }

    pub fn token_ttl(&self) -> Duration {
        self.token_ttl
    }

    /// Trailing window for the lab, imaging and vital-sign indicators.
    pub fn indicator_window(&self) -> Duration {
        self.indicator_window
    }

    /// Window used by the `new_admission_24` roster filter. Fixed, not configurable.
    pub fn new_admission_window(&self) -> Duration {
        Duration::hours(NEW_ADMISSION_WINDOW_HOURS)
    }
}

fn positive_int_from_env_value(
    name: &str,
    value: Option<String>,
    default: i64,
) -> MedicardResult<i64> {
    let value = value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());

    match value {
        None => Ok(default),
        Some(raw) => match raw.parse::<i64>() {
            Ok(n) if n > 0 => Ok(n),
            _ => Err(MedicardError::Config(format!(
                "{name} must be a positive integer, got {raw:?}"
            ))),
        },
    }
}

/// Parse the indicator window from an optional `MEDICARD_INDICATOR_WINDOW_HOURS` value.
///
/// If `value` is `None` or empty/whitespace, returns the 48 hour default.
pub fn indicator_window_from_env_value(value: Option<String>) -> MedicardResult<Duration> {
    positive_int_from_env_value(
        "MEDICARD_INDICATOR_WINDOW_HOURS",
        value,
        DEFAULT_INDICATOR_WINDOW_HOURS,
    )
    .map(Duration::hours)
}

/// Parse the token lifetime from an optional `JWT_ACCESS_TOKEN_EXPIRES` value (seconds).
pub fn token_ttl_from_env_value(value: Option<String>) -> MedicardResult<Duration> {
    positive_int_from_env_value("JWT_ACCESS_TOKEN_EXPIRES", value, DEFAULT_TOKEN_TTL_SECS)
        .map(Duration::seconds)
}

/// Require the signing secret to be present.
pub fn jwt_secret_from_env_value(value: Option<String>) -> MedicardResult<String> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| MedicardError::Config("JWT_SECRET_KEY is not set".into()))
}
