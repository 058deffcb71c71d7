use super::{page_request, Paged};
use crate::error::ApiResult;
use crate::extract::CurrentUser;
use crate::AppState;
use api_shared::MessageRes;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use medicard_core::models::{Consult, ConsultStatus, ConsultUpdate, NewConsult};
use medicard_core::repositories::ConsultService;
use medicard_core::roles::{ADMIN_ONLY, CLINICIANS, WARD_STAFF};
use serde::Deserialize;
use utoipa::IntoParams;

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ConsultQuery {
    pub patient_id: Option<i64>,
    pub status: Option<ConsultStatus>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

#[utoipa::path(
    get,
    path = "/api/consults",
    params(ConsultQuery),
    responses(
        (status = 200, description = "Consults, most recently requested first", body = super::ConsultPage),
        (status = 400, description = "Invalid paging or status", body = api_shared::ErrorRes),
        (status = 403, description = "Role not permitted", body = api_shared::ErrorRes)
    ),
    security(("bearer" = []))
)]
#[axum::debug_handler]
pub async fn list_consults(
    State(state): State<AppState>,
    user: CurrentUser,
    query: Result<Query<ConsultQuery>, QueryRejection>,
) -> ApiResult<Json<Paged<Consult>>> {
    user.require_any(WARD_STAFF)?;
    let Query(query) = query?;
    let request = page_request(query.page, query.per_page)?;

    let page = ConsultService::new(state.db.clone())
        .list(query.patient_id, query.status, request)
        .await?;
    Ok(Json(page.into()))
}

#[utoipa::path(
    post,
    path = "/api/consults",
    request_body = NewConsult,
    responses(
        (status = 201, description = "Consult requested", body = Consult),
        (status = 400, description = "Invalid input or unknown reference", body = api_shared::ErrorRes),
        (status = 403, description = "Role not permitted", body = api_shared::ErrorRes)
    ),
    security(("bearer" = []))
)]
/// New consults always start as `Pending` and unread.
#[axum::debug_handler]
pub async fn create_consult(
    State(state): State<AppState>,
    user: CurrentUser,
    body: Result<Json<NewConsult>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Consult>)> {
    user.require_any(CLINICIANS)?;
    let Json(new) = body?;
    let consult = ConsultService::new(state.db.clone())
        .create(new, Utc::now())
        .await?;
    Ok((StatusCode::CREATED, Json(consult)))
}

#[utoipa::path(
    get,
    path = "/api/consults/{id}",
    params(("id" = i64, Path, description = "Consult id")),
    responses(
        (status = 200, description = "Consult", body = Consult),
        (status = 404, description = "No such consult", body = api_shared::ErrorRes)
    ),
    security(("bearer" = []))
)]
#[axum::debug_handler]
pub async fn get_consult(
    State(state): State<AppState>,
    user: CurrentUser,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Consult>> {
    user.require_any(WARD_STAFF)?;
    let Path(id) = id?;
    Ok(Json(ConsultService::new(state.db.clone()).get(id).await?))
}

#[utoipa::path(
    put,
    path = "/api/consults/{id}",
    params(("id" = i64, Path, description = "Consult id")),
    request_body = ConsultUpdate,
    responses(
        (status = 200, description = "Updated consult", body = Consult),
        (status = 400, description = "Invalid input", body = api_shared::ErrorRes),
        (status = 404, description = "No such consult", body = api_shared::ErrorRes)
    ),
    security(("bearer" = []))
)]
#[axum::debug_handler]
pub async fn update_consult(
    State(state): State<AppState>,
    user: CurrentUser,
    id: Result<Path<i64>, PathRejection>,
    body: Result<Json<ConsultUpdate>, JsonRejection>,
) -> ApiResult<Json<Consult>> {
    user.require_any(CLINICIANS)?;
    let Path(id) = id?;
    let Json(update) = body?;
    let consult = ConsultService::new(state.db.clone())
        .update(id, update)
        .await?;
    Ok(Json(consult))
}

#[utoipa::path(
    delete,
    path = "/api/consults/{id}",
    params(("id" = i64, Path, description = "Consult id")),
    responses(
        (status = 200, description = "Consult deleted", body = MessageRes),
        (status = 403, description = "Admins only", body = api_shared::ErrorRes),
        (status = 404, description = "No such consult", body = api_shared::ErrorRes)
    ),
    security(("bearer" = []))
)]
#[axum::debug_handler]
pub async fn delete_consult(
    State(state): State<AppState>,
    user: CurrentUser,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<MessageRes>> {
    user.require_any(ADMIN_ONLY)?;
    let Path(id) = id?;
    ConsultService::new(state.db.clone()).delete(id).await?;
    tracing::warn!("consult {} deleted by user {}", id, user.id());
    Ok(Json(MessageRes::new("Consult deleted successfully")))
}

#[utoipa::path(
    post,
    path = "/api/consults/{id}/read",
    params(("id" = i64, Path, description = "Consult id")),
    responses(
        (status = 200, description = "Consult with read time recorded", body = Consult),
        (status = 403, description = "Caller is not the assigned physician", body = api_shared::ErrorRes),
        (status = 404, description = "No such consult", body = api_shared::ErrorRes)
    ),
    security(("bearer" = []))
)]
/// Mark a consult read. Only its assigned physician may do this, whatever their role.
#[axum::debug_handler]
pub async fn mark_consult_read(
    State(state): State<AppState>,
    user: CurrentUser,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Consult>> {
    let Path(id) = id?;
    let consult = ConsultService::new(state.db.clone())
        .mark_read(id, user.id(), Utc::now())
        .await?;
    Ok(Json(consult))
}
