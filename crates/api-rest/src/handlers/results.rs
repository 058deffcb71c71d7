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
use medicard_core::models::{LabResult, LabResultUpdate, NewLabResult};
use medicard_core::repositories::{ClinicalFilter, ResultService};
use medicard_core::roles::{ADMIN_ONLY, RESULT_READERS, RESULT_WRITERS, WARD_STAFF};
use serde::Deserialize;
use utoipa::IntoParams;

/// Filters shared by the lab-result and imaging listings.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ClinicalQuery {
    pub patient_id: Option<i64>,
    pub admission_id: Option<i64>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl ClinicalQuery {
    pub(crate) fn filter(&self) -> ClinicalFilter {
        ClinicalFilter {
            patient_id: self.patient_id,
            admission_id: self.admission_id,
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/results",
    params(ClinicalQuery),
    responses(
        (status = 200, description = "Lab results, newest first", body = super::LabResultPage),
        (status = 400, description = "Invalid paging", body = api_shared::ErrorRes),
        (status = 403, description = "Role not permitted", body = api_shared::ErrorRes)
    ),
    security(("bearer" = []))
)]
#[axum::debug_handler]
pub async fn list_results(
    State(state): State<AppState>,
    user: CurrentUser,
    query: Result<Query<ClinicalQuery>, QueryRejection>,
) -> ApiResult<Json<Paged<LabResult>>> {
    user.require_any(RESULT_READERS)?;
    let Query(query) = query?;
    let request = page_request(query.page, query.per_page)?;

    let page = ResultService::new(state.db.clone())
        .list(query.filter(), request)
        .await?;
    Ok(Json(page.into()))
}

#[utoipa::path(
    post,
    path = "/api/results",
    request_body = NewLabResult,
    responses(
        (status = 201, description = "Result recorded", body = LabResult),
        (status = 400, description = "Invalid input or unknown admission", body = api_shared::ErrorRes),
        (status = 403, description = "Role not permitted", body = api_shared::ErrorRes)
    ),
    security(("bearer" = []))
)]
#[axum::debug_handler]
pub async fn create_result(
    State(state): State<AppState>,
    user: CurrentUser,
    body: Result<Json<NewLabResult>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<LabResult>)> {
    user.require_any(RESULT_WRITERS)?;
    let Json(new) = body?;
    let result = ResultService::new(state.db.clone())
        .create(new, Utc::now())
        .await?;
    Ok((StatusCode::CREATED, Json(result)))
}

#[utoipa::path(
    get,
    path = "/api/results/{id}",
    params(("id" = i64, Path, description = "Result id")),
    responses(
        (status = 200, description = "Lab result", body = LabResult),
        (status = 404, description = "No such result", body = api_shared::ErrorRes)
    ),
    security(("bearer" = []))
)]
#[axum::debug_handler]
pub async fn get_result(
    State(state): State<AppState>,
    user: CurrentUser,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<LabResult>> {
    user.require_any(RESULT_READERS)?;
    let Path(id) = id?;
    Ok(Json(ResultService::new(state.db.clone()).get(id).await?))
}

#[utoipa::path(
    put,
    path = "/api/results/{id}",
    params(("id" = i64, Path, description = "Result id")),
    request_body = LabResultUpdate,
    responses(
        (status = 200, description = "Updated result", body = LabResult),
        (status = 400, description = "Invalid input", body = api_shared::ErrorRes),
        (status = 403, description = "Role not permitted", body = api_shared::ErrorRes),
        (status = 404, description = "No such result", body = api_shared::ErrorRes)
    ),
    security(("bearer" = []))
)]
/// Correct a result's name, value, criticality or time; acknowledgement cannot be changed here.
#[axum::debug_handler]
pub async fn update_result(
    State(state): State<AppState>,
    user: CurrentUser,
    id: Result<Path<i64>, PathRejection>,
    body: Result<Json<LabResultUpdate>, JsonRejection>,
) -> ApiResult<Json<LabResult>> {
    user.require_any(RESULT_WRITERS)?;
    let Path(id) = id?;
    let Json(update) = body?;
    let result = ResultService::new(state.db.clone())
        .update(id, update)
        .await?;
    Ok(Json(result))
}

#[utoipa::path(
    delete,
    path = "/api/results/{id}",
    params(("id" = i64, Path, description = "Result id")),
    responses(
        (status = 200, description = "Result deleted", body = MessageRes),
        (status = 403, description = "Admins only", body = api_shared::ErrorRes),
        (status = 404, description = "No such result", body = api_shared::ErrorRes)
    ),
    security(("bearer" = []))
)]
#[axum::debug_handler]
pub async fn delete_result(
    State(state): State<AppState>,
    user: CurrentUser,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<MessageRes>> {
    user.require_any(ADMIN_ONLY)?;
    let Path(id) = id?;
    ResultService::new(state.db.clone()).delete(id).await?;
    tracing::warn!("result {} deleted by user {}", id, user.id());
    Ok(Json(MessageRes::new("Result deleted successfully")))
}

#[utoipa::path(
    post,
    path = "/api/results/{id}/acknowledge",
    params(("id" = i64, Path, description = "Result id")),
    responses(
        (status = 200, description = "Result with acknowledgement recorded", body = LabResult),
        (status = 403, description = "Role not permitted", body = api_shared::ErrorRes),
        (status = 404, description = "No such result", body = api_shared::ErrorRes)
    ),
    security(("bearer" = []))
)]
/// Acknowledge a result on behalf of the caller.
///
/// Repeating the call is harmless: the first acknowledgement is kept.
#[axum::debug_handler]
pub async fn acknowledge_result(
    State(state): State<AppState>,
    user: CurrentUser,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<LabResult>> {
    user.require_any(WARD_STAFF)?;
    let Path(id) = id?;
    let result = ResultService::new(state.db.clone())
        .acknowledge(id, user.id(), Utc::now())
        .await?;
    Ok(Json(result))
}
