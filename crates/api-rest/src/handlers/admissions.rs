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
use medicard_core::models::{Admission, AdmissionUpdate, NewAdmission};
use medicard_core::repositories::AdmissionService;
use medicard_core::roles::{ADMIN_ONLY, WARD_STAFF};
use serde::Deserialize;
use utoipa::IntoParams;

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AdmissionQuery {
    pub patient_id: Option<i64>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

#[utoipa::path(
    get,
    path = "/api/admissions",
    params(AdmissionQuery),
    responses(
        (status = 200, description = "Admissions, most recent first", body = super::AdmissionPage),
        (status = 400, description = "Invalid paging", body = api_shared::ErrorRes),
        (status = 403, description = "Role not permitted", body = api_shared::ErrorRes)
    ),
    security(("bearer" = []))
)]
#[axum::debug_handler]
pub async fn list_admissions(
    State(state): State<AppState>,
    user: CurrentUser,
    query: Result<Query<AdmissionQuery>, QueryRejection>,
) -> ApiResult<Json<Paged<Admission>>> {
    user.require_any(WARD_STAFF)?;
    let Query(query) = query?;
    let request = page_request(query.page, query.per_page)?;

    let page = AdmissionService::new(state.db.clone())
        .list(query.patient_id, request)
        .await?;
    Ok(Json(page.into()))
}

#[utoipa::path(
    post,
    path = "/api/admissions",
    request_body = NewAdmission,
    responses(
        (status = 201, description = "Admission opened", body = Admission),
        (status = 400, description = "Invalid input or unknown patient", body = api_shared::ErrorRes)
    ),
    security(("bearer" = []))
)]
#[axum::debug_handler]
pub async fn create_admission(
    State(state): State<AppState>,
    user: CurrentUser,
    body: Result<Json<NewAdmission>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Admission>)> {
    user.require_any(WARD_STAFF)?;
    let Json(new) = body?;
    let admission = AdmissionService::new(state.db.clone())
        .create(new, Utc::now())
        .await?;
    Ok((StatusCode::CREATED, Json(admission)))
}

#[utoipa::path(
    get,
    path = "/api/admissions/{id}",
    params(("id" = i64, Path, description = "Admission id")),
    responses(
        (status = 200, description = "Admission", body = Admission),
        (status = 404, description = "No such admission", body = api_shared::ErrorRes)
    ),
    security(("bearer" = []))
)]
#[axum::debug_handler]
pub async fn get_admission(
    State(state): State<AppState>,
    user: CurrentUser,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Admission>> {
    user.require_any(WARD_STAFF)?;
    let Path(id) = id?;
    Ok(Json(AdmissionService::new(state.db.clone()).get(id).await?))
}

#[utoipa::path(
    put,
    path = "/api/admissions/{id}",
    params(("id" = i64, Path, description = "Admission id")),
    request_body = AdmissionUpdate,
    responses(
        (status = 200, description = "Updated admission", body = Admission),
        (status = 400, description = "Invalid input", body = api_shared::ErrorRes),
        (status = 404, description = "No such admission", body = api_shared::ErrorRes)
    ),
    security(("bearer" = []))
)]
/// Set `discharged_at` to close the admission.
#[axum::debug_handler]
pub async fn update_admission(
    State(state): State<AppState>,
    user: CurrentUser,
    id: Result<Path<i64>, PathRejection>,
    body: Result<Json<AdmissionUpdate>, JsonRejection>,
) -> ApiResult<Json<Admission>> {
    user.require_any(WARD_STAFF)?;
    let Path(id) = id?;
    let Json(update) = body?;
    let admission = AdmissionService::new(state.db.clone())
        .update(id, update)
        .await?;
    Ok(Json(admission))
}

#[utoipa::path(
    delete,
    path = "/api/admissions/{id}",
    params(("id" = i64, Path, description = "Admission id")),
    responses(
        (status = 200, description = "Admission and its clinical records deleted", body = MessageRes),
        (status = 403, description = "Admins only", body = api_shared::ErrorRes),
        (status = 404, description = "No such admission", body = api_shared::ErrorRes)
    ),
    security(("bearer" = []))
)]
#[axum::debug_handler]
pub async fn delete_admission(
    State(state): State<AppState>,
    user: CurrentUser,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<MessageRes>> {
    user.require_any(ADMIN_ONLY)?;
    let Path(id) = id?;
    AdmissionService::new(state.db.clone()).delete(id).await?;
    tracing::warn!("admission {} deleted by user {}", id, user.id());
    Ok(Json(MessageRes::new("Admission deleted successfully")))
}
