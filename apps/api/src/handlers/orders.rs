//! Order routes: cart pricing, checkout, lifecycle, full edit.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use crate::context::{AdminContext, TenantContext};
use crate::error::{ApiError, ApiResult};
use crate::extract::ApiJson;
use crate::AppState;
use dairy_core::order::{
    CreateOrderRequest, CreateOrderResult, OrderStatusResult, UpdateOrderRequest, UpdateStatusRequest,
};
use dairy_core::{CartLine, CoreError, Invoice, OrderWithItems, PricingResult};

fn default_validate_stock() -> bool {
    true
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceRequest {
    #[serde(default, alias = "lines")]
    pub items: Vec<CartLine>,
    #[serde(default = "default_validate_stock")]
    pub validate_stock: bool,
}

/// `POST /orders/price`. Recalculates the cart without side effects.
pub async fn price(
    State(state): State<AppState>,
    ctx: TenantContext,
    ApiJson(body): ApiJson<PriceRequest>,
) -> ApiResult<Json<PricingResult>> {
    let result = state
        .db
        .pricing()
        .price(&ctx.tenant_id, &body.items, body.validate_stock)
        .await?;
    Ok(Json(result))
}

/// `POST /orders`
pub async fn create(
    State(state): State<AppState>,
    ctx: TenantContext,
    ApiJson(body): ApiJson<CreateOrderRequest>,
) -> ApiResult<(StatusCode, Json<CreateOrderResult>)> {
    let created = state
        .db
        .orders()
        .create_order(&ctx.tenant_id, ctx.user_id.as_deref(), &body)
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// `GET /orders/:id`
pub async fn get(
    State(state): State<AppState>,
    ctx: TenantContext,
    Path(id): Path<String>,
) -> ApiResult<Json<OrderWithItems>> {
    Ok(Json(state.db.orders().get_order(&ctx.tenant_id, &id).await?))
}

/// `PUT /orders/:id`
pub async fn update(
    State(state): State<AppState>,
    ctx: AdminContext,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<UpdateOrderRequest>,
) -> ApiResult<Json<OrderWithItems>> {
    let updated = state
        .db
        .orders()
        .update_order(&ctx.tenant_id, &id, &body, Some(&ctx.user_id))
        .await?;
    Ok(Json(updated))
}

/// `PUT /orders/:id/status`
pub async fn update_status(
    State(state): State<AppState>,
    ctx: AdminContext,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<UpdateStatusRequest>,
) -> ApiResult<Json<OrderStatusResult>> {
    let result = state
        .db
        .orders()
        .update_order_status(&ctx.tenant_id, &id, body.status, Some(&ctx.user_id))
        .await?;
    Ok(Json(result))
}

/// `DELETE /orders/:id`
pub async fn delete(
    State(state): State<AppState>,
    ctx: AdminContext,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let deleted = state
        .db
        .orders()
        .delete_order(&ctx.tenant_id, &id, Some(&ctx.user_id))
        .await?;

    if !deleted {
        return Err(ApiError::from(CoreError::OrderNotFound(id)));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /orders/:id/invoices`
pub async fn invoices(
    State(state): State<AppState>,
    ctx: TenantContext,
    Path(id): Path<String>,
) -> ApiResult<Json<Vec<Invoice>>> {
    Ok(Json(state.db.orders().list_order_invoices(&ctx.tenant_id, &id).await?))
}
