//! Password hashing and access tokens.
//!
//! Passwords are stored as argon2 PHC strings. Access tokens are HS256 JWTs carrying the user
//! id and role; the role in a token is informational only, every request reloads the user so
//! that deactivation and role changes take effect immediately.

use crate::config::CoreConfig;
use crate::roles::Role;
use crate::{MedicardError, MedicardResult};
use argon2::password_hash::{rand_core::OsRng, PasswordHasher, SaltString};
use argon2::{Argon2, PasswordHash, PasswordVerifier};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Hash a password with argon2 and a fresh random salt.
///
/// Runs on the blocking pool; argon2 is deliberately slow.
pub async fn hash_password(password: &str) -> MedicardResult<String> {
    let password = password.to_owned();
    tokio::task::spawn_blocking(move || {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| MedicardError::PasswordHash(e.to_string()))
    })
    .await
    .map_err(|e| MedicardError::PasswordHash(e.to_string()))?
}

/// Check `password` against a stored argon2 hash.
///
/// Returns `Ok(false)` on a mismatch; an unparseable stored hash is an error.
pub async fn verify_password(password: &str, stored_hash: &str) -> MedicardResult<bool> {
    let password = password.to_owned();
    let stored_hash = stored_hash.to_owned();
    tokio::task::spawn_blocking(move || {
        let parsed = PasswordHash::new(&stored_hash)
            .map_err(|e| MedicardError::PasswordHash(e.to_string()))?;
        match Argon2::default().verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(MedicardError::PasswordHash(e.to_string())),
        }
    })
    .await
    .map_err(|e| MedicardError::PasswordHash(e.to_string()))?
}

/// JWT claims issued at login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User id, as a decimal string.
    pub sub: String,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn user_id(&self) -> MedicardResult<i64> {
        self.sub
            .parse()
            .map_err(|_| MedicardError::Unauthenticated("token subject is not a user id".into()))
    }
}

/// Issues and verifies access tokens with the configured secret.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenService {
    pub fn new(cfg: &CoreConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(cfg.jwt_secret().as_bytes()),
            decoding: DecodingKey::from_secret(cfg.jwt_secret().as_bytes()),
            ttl: cfg.token_ttl(),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue a token for `user_id` valid from `now` for the configured lifetime.
    pub fn issue(&self, user_id: i64, role: Role, now: DateTime<Utc>) -> MedicardResult<String> {
        let claims = Claims {
            sub: user_id.to_string(),
            role,
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(MedicardError::TokenIssue)
    }

    /// Verify signature and expiry and return the claims.
    pub fn verify(&self, token: &str) -> MedicardResult<Claims> {
        let validation = Validation::new(Algorithm::HS256);
        decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(MedicardError::InvalidToken)
    }
}
