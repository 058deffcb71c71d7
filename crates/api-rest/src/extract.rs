//! Request extractors for the authenticated caller.

use crate::error::{ApiError, ApiResult};
use crate::AppState;
use api_shared::auth::bearer_token;
use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use medicard_core::models::User;
use medicard_core::repositories::UserService;
use medicard_core::{MedicardError, Role};

/// The user behind a valid bearer token.
///
/// The user is reloaded on every request so that deactivation takes effect immediately;
/// an inactive or deleted account is rejected with 401 even if its token has not expired.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl CurrentUser {
    pub fn id(&self) -> i64 {
        self.0.id
    }

    pub fn role(&self) -> Role {
        self.0.role
    }

    /// Capability check called at the top of a handler.
    pub fn require_any(&self, allowed: &[Role]) -> ApiResult<()> {
        if self.0.role.is_any_of(allowed) {
            Ok(())
        } else {
            tracing::debug!(
                "user {} with role {} denied; requires one of {:?}",
                self.0.id,
                self.0.role,
                allowed
            );
            Err(ApiError::forbidden(format!(
                "role {} may not perform this action",
                self.0.role
            )))
        }
    }
}

async fn resolve(parts: &Parts, state: &AppState) -> ApiResult<User> {
    let header = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok());
    let token = bearer_token(header)?;
    let claims = state.tokens.verify(token)?;

    let user = UserService::new(state.db.clone())
        .find(claims.user_id()?)
        .await?
        .ok_or_else(|| ApiError::unauthorized("account no longer exists"))?;
    if !user.is_active {
        return Err(MedicardError::InactiveAccount.into());
    }
    Ok(user)
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        resolve(parts, state).await.map(CurrentUser)
    }
}

/// Like [`CurrentUser`] but never rejects; guests and bad tokens yield `None`.
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<User>);

#[async_trait]
impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        Ok(MaybeUser(resolve(parts, state).await.ok()))
    }
}
