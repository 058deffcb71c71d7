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
use medicard_core::models::{NewOrder, Order, OrderStatus, OrderUpdate};
use medicard_core::repositories::OrderService;
use medicard_core::roles::{ADMIN_ONLY, CLINICIANS, ORDER_READERS};
use serde::Deserialize;
use utoipa::IntoParams;

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct OrderQuery {
    pub patient_id: Option<i64>,
    pub status: Option<OrderStatus>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

#[utoipa::path(
    get,
    path = "/api/orders",
    params(OrderQuery),
    responses(
        (status = 200, description = "Orders, newest first", body = super::OrderPage),
        (status = 400, description = "Invalid paging or status", body = api_shared::ErrorRes),
        (status = 403, description = "Role not permitted", body = api_shared::ErrorRes)
    ),
    security(("bearer" = []))
)]
#[axum::debug_handler]
pub async fn list_orders(
    State(state): State<AppState>,
    user: CurrentUser,
    query: Result<Query<OrderQuery>, QueryRejection>,
) -> ApiResult<Json<Paged<Order>>> {
    user.require_any(ORDER_READERS)?;
    let Query(query) = query?;
    let request = page_request(query.page, query.per_page)?;

    let page = OrderService::new(state.db.clone())
        .list(query.patient_id, query.status, request)
        .await?;
    Ok(Json(page.into()))
}

#[utoipa::path(
    post,
    path = "/api/orders",
    request_body = NewOrder,
    responses(
        (status = 201, description = "Order placed", body = Order),
        (status = 400, description = "Invalid input or unknown reference", body = api_shared::ErrorRes),
        (status = 403, description = "Role not permitted", body = api_shared::ErrorRes)
    ),
    security(("bearer" = []))
)]
#[axum::debug_handler]
pub async fn create_order(
    State(state): State<AppState>,
    user: CurrentUser,
    body: Result<Json<NewOrder>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Order>)> {
    user.require_any(CLINICIANS)?;
    let Json(new) = body?;
    let order = OrderService::new(state.db.clone())
        .create(new, Utc::now())
        .await?;
    Ok((StatusCode::CREATED, Json(order)))
}

#[utoipa::path(
    get,
    path = "/api/orders/{id}",
    params(("id" = i64, Path, description = "Order id")),
    responses(
        (status = 200, description = "Order", body = Order),
        (status = 404, description = "No such order", body = api_shared::ErrorRes)
    ),
    security(("bearer" = []))
)]
#[axum::debug_handler]
pub async fn get_order(
    State(state): State<AppState>,
    user: CurrentUser,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Order>> {
    user.require_any(ORDER_READERS)?;
    let Path(id) = id?;
    Ok(Json(OrderService::new(state.db.clone()).get(id).await?))
}

#[utoipa::path(
    put,
    path = "/api/orders/{id}",
    params(("id" = i64, Path, description = "Order id")),
    request_body = OrderUpdate,
    responses(
        (status = 200, description = "Updated order", body = Order),
        (status = 400, description = "Invalid input", body = api_shared::ErrorRes),
        (status = 404, description = "No such order", body = api_shared::ErrorRes)
    ),
    security(("bearer" = []))
)]
/// Signing an order is a status change from `PendingSignature`.
#[axum::debug_handler]
pub async fn update_order(
    State(state): State<AppState>,
    user: CurrentUser,
    id: Result<Path<i64>, PathRejection>,
    body: Result<Json<OrderUpdate>, JsonRejection>,
) -> ApiResult<Json<Order>> {
    user.require_any(CLINICIANS)?;
    let Path(id) = id?;
    let Json(update) = body?;
    let order = OrderService::new(state.db.clone())
        .update(id, update)
        .await?;
    Ok(Json(order))
}

#[utoipa::path(
    delete,
    path = "/api/orders/{id}",
    params(("id" = i64, Path, description = "Order id")),
    responses(
        (status = 200, description = "Order deleted", body = MessageRes),
        (status = 403, description = "Admins only", body = api_shared::ErrorRes),
        (status = 404, description = "No such order", body = api_shared::ErrorRes)
    ),
    security(("bearer" = []))
)]
#[axum::debug_handler]
pub async fn delete_order(
    State(state): State<AppState>,
    user: CurrentUser,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<MessageRes>> {
    user.require_any(ADMIN_ONLY)?;
    let Path(id) = id?;
    OrderService::new(state.db.clone()).delete(id).await?;
    tracing::warn!("order {} deleted by user {}", id, user.id());
    Ok(Json(MessageRes::new("Order deleted successfully")))
}
