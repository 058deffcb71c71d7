//! Vital-sign observations recorded against an admission.

use super::{page_request, Paged};
use crate::error::{ApiError, ApiResult};
use crate::extract::CurrentUser;
use crate::AppState;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use medicard_core::models::{NewVitalSign, VitalSignView};
use medicard_core::repositories::VitalsService;
use medicard_core::roles::{VITALS_WRITERS, WARD_STAFF};
use serde::Deserialize;
use utoipa::IntoParams;

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct VitalsQuery {
    /// Inclusive lower bound, RFC 3339.
    pub start_time: Option<String>,
    /// Inclusive upper bound, RFC 3339.
    pub end_time: Option<String>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

fn parse_time(name: &str, value: Option<&str>) -> ApiResult<Option<DateTime<Utc>>> {
    value
        .map(|raw| {
            DateTime::parse_from_rfc3339(raw.trim())
                .map(|t| t.with_timezone(&Utc))
                .map_err(|_| {
                    ApiError::bad_request(format!("{name} must be an RFC 3339 timestamp, got {raw:?}"))
                })
        })
        .transpose()
}

#[utoipa::path(
    post,
    path = "/api/admissions/{id}/vitals",
    params(("id" = i64, Path, description = "Admission id")),
    request_body = NewVitalSign,
    responses(
        (status = 201, description = "Observations recorded", body = VitalSignView),
        (status = 400, description = "Invalid measurements", body = api_shared::ErrorRes),
        (status = 403, description = "Role not permitted", body = api_shared::ErrorRes),
        (status = 404, description = "No such admission", body = api_shared::ErrorRes)
    ),
    security(("bearer" = []))
)]
/// Record vitals; the caller is recorded as the observer and `recorded_at` defaults to now.
#[axum::debug_handler]
pub async fn record_vitals(
    State(state): State<AppState>,
    user: CurrentUser,
    id: Result<Path<i64>, PathRejection>,
    body: Result<Json<NewVitalSign>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<VitalSignView>)> {
    user.require_any(VITALS_WRITERS)?;
    let Path(admission_id) = id?;
    let Json(new) = body?;
    let view = VitalsService::new(state.db.clone())
        .record(admission_id, user.id(), new, Utc::now())
        .await?;
    Ok((StatusCode::CREATED, Json(view)))
}

#[utoipa::path(
    get,
    path = "/api/admissions/{id}/vitals",
    params(("id" = i64, Path, description = "Admission id"), VitalsQuery),
    responses(
        (status = 200, description = "Observations, newest first", body = super::VitalSignPage),
        (status = 400, description = "Invalid time range or paging", body = api_shared::ErrorRes),
        (status = 404, description = "No such admission", body = api_shared::ErrorRes)
    ),
    security(("bearer" = []))
)]
#[axum::debug_handler]
pub async fn list_vitals(
    State(state): State<AppState>,
    user: CurrentUser,
    id: Result<Path<i64>, PathRejection>,
    query: Result<Query<VitalsQuery>, QueryRejection>,
) -> ApiResult<Json<Paged<VitalSignView>>> {
    user.require_any(WARD_STAFF)?;
    let Path(admission_id) = id?;
    let Query(query) = query?;
    let start = parse_time("start_time", query.start_time.as_deref())?;
    let end = parse_time("end_time", query.end_time.as_deref())?;
    let request = page_request(query.page, query.per_page)?;

    let page = VitalsService::new(state.db.clone())
        .list(admission_id, start, end, request)
        .await?;
    Ok(Json(page.into()))
}
