//! Admin routes: payment recording and the inventory ledger.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::context::{AdminContext, TenantContext};
use crate::error::ApiResult;
use crate::extract::{ApiJson, ApiQuery};
use crate::AppState;
use dairy_core::inventory::{StockAdjustment, TransactionFilter};
use dairy_core::order::RecordPaymentRequest;
use dairy_core::{InventoryTransaction, Invoice, Page};

/// `POST /admin/invoices`
pub async fn record_payment(
    State(state): State<AppState>,
    ctx: AdminContext,
    ApiJson(body): ApiJson<RecordPaymentRequest>,
) -> ApiResult<(StatusCode, Json<Invoice>)> {
    let invoice = state
        .db
        .payments()
        .create_invoice(&ctx.tenant_id, &body, Some(&ctx.user_id))
        .await?;
    Ok((StatusCode::CREATED, Json(invoice)))
}

/// `POST /admin/inventory/adjust`
pub async fn adjust_stock(
    State(state): State<AppState>,
    ctx: AdminContext,
    ApiJson(body): ApiJson<StockAdjustment>,
) -> ApiResult<(StatusCode, Json<InventoryTransaction>)> {
    let entry = state
        .db
        .inventory()
        .adjust_stock(&ctx.tenant_id, &body, Some(&ctx.user_id))
        .await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionQuery {
    pub product_id: Option<String>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

/// `GET /admin/inventory/transactions?productId=&from=&to=&page=&pageSize=`
pub async fn list_transactions(
    State(state): State<AppState>,
    ctx: TenantContext,
    ApiQuery(query): ApiQuery<TransactionQuery>,
) -> ApiResult<Json<Page<InventoryTransaction>>> {
    let filter = TransactionFilter {
        product_id: query.product_id,
        from: query.from,
        to: query.to,
    };
    let page = state
        .db
        .inventory()
        .list_transactions(&ctx.tenant_id, &filter, query.page, query.page_size)
        .await?;
    Ok(Json(page))
}
