//! Registration, login and session status.

use api_shared::MessageRes;
use crate::error::{ApiError, ApiResult};
use crate::extract::{CurrentUser, MaybeUser};
use crate::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use medicard_core::models::{NewUser, User};
use medicard_core::repositories::UserService;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginReq {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginRes {
    /// Bearer token for the `Authorization` header.
    pub token: String,
    pub token_type: String,
    /// Token lifetime in seconds.
    pub expires_in: i64,
    pub user: User,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StatusRes {
    pub is_logged_in: bool,
    pub user: Option<User>,
}

#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = NewUser,
    responses(
        (status = 201, description = "User registered", body = User),
        (status = 400, description = "Invalid input", body = api_shared::ErrorRes),
        (status = 409, description = "Username or email taken", body = api_shared::ErrorRes)
    )
)]
#[axum::debug_handler]
pub async fn register(
    State(state): State<AppState>,
    body: Result<Json<NewUser>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<User>)> {
    let Json(new) = body?;
    let user = UserService::new(state.db.clone())
        .register(new, Utc::now())
        .await?;
    Ok((StatusCode::CREATED, Json(user)))
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginReq,
    responses(
        (status = 200, description = "Logged in", body = LoginRes),
        (status = 401, description = "Invalid credentials or inactive account", body = api_shared::ErrorRes)
    )
)]
#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    body: Result<Json<LoginReq>, JsonRejection>,
) -> ApiResult<Json<LoginRes>> {
    let Json(req) = body?;
    let now = Utc::now();
    let user = UserService::new(state.db.clone())
        .authenticate(&req.email, &req.password, now)
        .await
        .map_err(|e| {
            tracing::info!("Login failed: {}", e);
            ApiError::from(e)
        })?;
    let token = state.tokens.issue(user.id, user.role, now)?;

    tracing::info!("user {} logged in", user.id);
    Ok(Json(LoginRes {
        token,
        token_type: "Bearer".into(),
        expires_in: state.tokens.ttl().num_seconds(),
        user,
    }))
}

#[utoipa::path(
    get,
    path = "/api/auth/status",
    responses(
        (status = 200, description = "Whether the caller holds a valid token", body = StatusRes)
    )
)]
/// Never fails; a missing, expired or invalid token simply reports `is_logged_in: false`.
#[axum::debug_handler(state = crate::AppState)]
pub async fn status(MaybeUser(user): MaybeUser) -> Json<StatusRes> {
    Json(StatusRes {
        is_logged_in: user.is_some(),
        user,
    })
}


#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses(
        (status = 200, description = "Logged out", body = MessageRes),
        (status = 401, description = "Not authenticated", body = api_shared::ErrorRes)
    ),
    security(("bearer" = []))
)]
/// Tokens are stateless, so nothing is revoked server-side; the client discards its token.
#[axum::debug_handler(state = crate::AppState)]
pub async fn logout(user: CurrentUser) -> Json<MessageRes> {
    tracing::info!("user {} logged out", user.id());
    Json(MessageRes::new("Logout successful"))
}
