use super::{page_request, Paged};
use crate::error::ApiResult;
use crate::extract::CurrentUser;
use crate::AppState;
use api_shared::MessageRes;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use medicard_core::models::{NewPatient, Patient, PatientUpdate};
use medicard_core::repositories::PatientService;
use medicard_core::roles::{ADMIN_ONLY, WARD_STAFF};
use serde::Deserialize;
use utoipa::IntoParams;

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PatientSearch {
    /// Case-insensitive substring of MRN, first name or last name.
    pub search: Option<String>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

#[utoipa::path(
    get,
    path = "/api/patients",
    params(PatientSearch),
    responses(
        (status = 200, description = "Patients ordered by name", body = super::PatientPage),
        (status = 400, description = "Invalid paging", body = api_shared::ErrorRes),
        (status = 403, description = "Role not permitted", body = api_shared::ErrorRes)
    ),
    security(("bearer" = []))
)]
#[axum::debug_handler]
pub async fn list_patients(
    State(state): State<AppState>,
    user: CurrentUser,
    query: Result<Query<PatientSearch>, QueryRejection>,
) -> ApiResult<Json<Paged<Patient>>> {
    user.require_any(WARD_STAFF)?;
    let Query(query) = query?;
    let request = page_request(query.page, query.per_page)?;

    let page = PatientService::new(state.db.clone())
        .list(query.search.as_deref(), request)
        .await?;
    Ok(Json(page.into()))
}

#[utoipa::path(
    post,
    path = "/api/patients",
    request_body = NewPatient,
    responses(
        (status = 201, description = "Patient created", body = Patient),
        (status = 400, description = "Invalid input", body = api_shared::ErrorRes),
        (status = 409, description = "MRN already in use", body = api_shared::ErrorRes)
    ),
    security(("bearer" = []))
)]
#[axum::debug_handler]
pub async fn create_patient(
    State(state): State<AppState>,
    user: CurrentUser,
    body: Result<Json<NewPatient>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Patient>)> {
    user.require_any(WARD_STAFF)?;
    let Json(new) = body?;
    let patient = PatientService::new(state.db.clone()).create(new).await?;
    Ok((StatusCode::CREATED, Json(patient)))
}

#[utoipa::path(
    get,
    path = "/api/patients/{mrn}",
    params(("mrn" = String, Path, description = "Medical record number")),
    responses(
        (status = 200, description = "Patient", body = Patient),
        (status = 404, description = "No such MRN", body = api_shared::ErrorRes)
    ),
    security(("bearer" = []))
)]
#[axum::debug_handler]
pub async fn get_patient(
    State(state): State<AppState>,
    user: CurrentUser,
    mrn: Result<Path<String>, PathRejection>,
) -> ApiResult<Json<Patient>> {
    user.require_any(WARD_STAFF)?;
    let Path(mrn) = mrn?;
    let patient = PatientService::new(state.db.clone()).get_by_mrn(&mrn).await?;
    Ok(Json(patient))
}

#[utoipa::path(
    put,
    path = "/api/patients/{mrn}",
    params(("mrn" = String, Path, description = "Medical record number")),
    request_body = PatientUpdate,
    responses(
        (status = 200, description = "Updated patient", body = Patient),
        (status = 400, description = "Invalid input", body = api_shared::ErrorRes),
        (status = 404, description = "No such MRN", body = api_shared::ErrorRes)
    ),
    security(("bearer" = []))
)]
#[axum::debug_handler]
pub async fn update_patient(
    State(state): State<AppState>,
    user: CurrentUser,
    mrn: Result<Path<String>, PathRejection>,
    body: Result<Json<PatientUpdate>, JsonRejection>,
) -> ApiResult<Json<Patient>> {
    user.require_any(WARD_STAFF)?;
    let Path(mrn) = mrn?;
    let Json(update) = body?;
    let patient = PatientService::new(state.db.clone())
        .update(&mrn, update)
        .await?;
    Ok(Json(patient))
}

#[utoipa::path(
    delete,
    path = "/api/patients/{mrn}",
    params(("mrn" = String, Path, description = "Medical record number")),
    responses(
        (status = 200, description = "Patient and all linked records deleted", body = MessageRes),
        (status = 403, description = "Admins only", body = api_shared::ErrorRes),
        (status = 404, description = "No such MRN", body = api_shared::ErrorRes)
    ),
    security(("bearer" = []))
)]
/// Administrative override; cascades to admissions and every clinical record.
#[axum::debug_handler]
pub async fn delete_patient(
    State(state): State<AppState>,
    user: CurrentUser,
    mrn: Result<Path<String>, PathRejection>,
) -> ApiResult<Json<MessageRes>> {
    user.require_any(ADMIN_ONLY)?;
    let Path(mrn) = mrn?;
    PatientService::new(state.db.clone()).delete(&mrn).await?;
    tracing::warn!("patient {} deleted by user {}", mrn, user.id());
    Ok(Json(MessageRes::new("Patient deleted successfully")))
}
