use super::results::ClinicalQuery;
use super::{page_request, Paged};
use crate::error::ApiResult;
use crate::extract::CurrentUser;
use crate::AppState;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use medicard_core::models::{ImagingStudy, NewImagingStudy};
use medicard_core::repositories::ImagingService;
use medicard_core::roles::{IMAGING_READERS, IMAGING_WRITERS, WARD_STAFF};

#[utoipa::path(
    get,
    path = "/api/imaging",
    params(ClinicalQuery),
    responses(
        (status = 200, description = "Imaging studies, newest first", body = super::ImagingPage),
        (status = 400, description = "Invalid paging", body = api_shared::ErrorRes),
        (status = 403, description = "Role not permitted", body = api_shared::ErrorRes)
    ),
    security(("bearer" = []))
)]
#[axum::debug_handler]
pub async fn list_imaging(
    State(state): State<AppState>,
    user: CurrentUser,
    query: Result<Query<ClinicalQuery>, QueryRejection>,
) -> ApiResult<Json<Paged<ImagingStudy>>> {
    user.require_any(IMAGING_READERS)?;
    let Query(query) = query?;
    let request = page_request(query.page, query.per_page)?;

    let page = ImagingService::new(state.db.clone())
        .list(query.filter(), request)
        .await?;
    Ok(Json(page.into()))
}

#[utoipa::path(
    post,
    path = "/api/imaging",
    request_body = NewImagingStudy,
    responses(
        (status = 201, description = "Study recorded", body = ImagingStudy),
        (status = 400, description = "Invalid input or unknown admission", body = api_shared::ErrorRes),
        (status = 403, description = "Role not permitted", body = api_shared::ErrorRes)
    ),
    security(("bearer" = []))
)]
#[axum::debug_handler]
pub async fn create_imaging(
    State(state): State<AppState>,
    user: CurrentUser,
    body: Result<Json<NewImagingStudy>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<ImagingStudy>)> {
    user.require_any(IMAGING_WRITERS)?;
    let Json(new) = body?;
    let study = ImagingService::new(state.db.clone())
        .create(new, Utc::now())
        .await?;
    Ok((StatusCode::CREATED, Json(study)))
}

#[utoipa::path(
    get,
    path = "/api/imaging/{id}",
    params(("id" = i64, Path, description = "Imaging study id")),
    responses(
        (status = 200, description = "Imaging study", body = ImagingStudy),
        (status = 404, description = "No such study", body = api_shared::ErrorRes)
    ),
    security(("bearer" = []))
)]
#[axum::debug_handler]
pub async fn get_imaging(
    State(state): State<AppState>,
    user: CurrentUser,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<ImagingStudy>> {
    user.require_any(IMAGING_READERS)?;
    let Path(id) = id?;
    Ok(Json(ImagingService::new(state.db.clone()).get(id).await?))
}

#[utoipa::path(
    post,
    path = "/api/imaging/{id}/acknowledge",
    params(("id" = i64, Path, description = "Imaging study id")),
    responses(
        (status = 200, description = "Study with acknowledgement recorded", body = ImagingStudy),
        (status = 403, description = "Role not permitted", body = api_shared::ErrorRes),
        (status = 404, description = "No such study", body = api_shared::ErrorRes)
    ),
    security(("bearer" = []))
)]
#[axum::debug_handler]
pub async fn acknowledge_imaging(
    State(state): State<AppState>,
    user: CurrentUser,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<ImagingStudy>> {
    user.require_any(WARD_STAFF)?;
    let Path(id) = id?;
    let study = ImagingService::new(state.db.clone())
        .acknowledge(id, user.id(), Utc::now())
        .await?;
    Ok(Json(study))
}
