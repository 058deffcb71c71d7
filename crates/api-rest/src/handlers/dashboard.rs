use crate::error::{ApiError, ApiResult};
use crate::extract::CurrentUser;
use crate::AppState;
use api_shared::{PatientListParams, PatientListRes};
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::Json;
use chrono::Utc;
use medicard_core::{DashboardService, PatientListQuery};

#[utoipa::path(
    get,
    path = "/api/dashboard/patient-list",
    params(PatientListParams),
    responses(
        (status = 200, description = "One page of the roster with status indicators", body = PatientListRes),
        (status = 400, description = "Invalid page, limit or status", body = api_shared::ErrorRes),
        (status = 401, description = "Not authenticated", body = api_shared::ErrorRes),
        (status = 500, description = "Store failure; no partial result is returned", body = api_shared::ErrorRes)
    ),
    security(("bearer" = []))
)]
/// Dashboard patient list
///
/// Any authenticated user may call this. The unread-consult and pending-order indicators are
/// computed for the caller.
#[axum::debug_handler]
pub async fn patient_list(
    State(state): State<AppState>,
    user: CurrentUser,
    params: Result<Query<PatientListParams>, QueryRejection>,
) -> ApiResult<Json<PatientListRes>> {
    let Query(params) = params.map_err(|e| {
        tracing::warn!(
            "Dashboard patient list rejected query for user {}: {}",
            user.id(),
            e.body_text()
        );
        ApiError::from(e)
    })?;
    let query = PatientListQuery::from_params(&params).map_err(|e| {
        tracing::warn!(
            "Dashboard patient list rejected {:?} for user {}: {}",
            params,
            user.id(),
            e
        );
        ApiError::from(e)
    })?;

    let service = DashboardService::new(state.db.clone(), state.cfg.clone());
    match service.patient_list(user.id(), &query, Utc::now()).await {
        Ok(res) => Ok(Json(res)),
        Err(e) => {
            tracing::error!(
                "Dashboard patient list error for user {} with {:?}: {:?}",
                user.id(),
                params,
                e
            );
            Err(e.into())
        }
    }
}
