//! Client address book (admin console).

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use crate::context::{AdminContext, TenantContext};
use crate::error::ApiResult;
use crate::extract::ApiJson;
use crate::AppState;
use dairy_core::{AddressInput, AddressOwner, ClientAddress};

/// `GET /clients/:client_id/addresses`
pub async fn list(
    State(state): State<AppState>,
    ctx: TenantContext,
    Path(client_id): Path<String>,
) -> ApiResult<Json<Vec<ClientAddress>>> {
    let owner = AddressOwner::Client(client_id);
    Ok(Json(state.db.addresses().list(&ctx.tenant_id, &owner).await?))
}

/// `POST /clients/:client_id/addresses`
pub async fn create(
    State(state): State<AppState>,
    ctx: AdminContext,
    Path(client_id): Path<String>,
    ApiJson(body): ApiJson<AddressInput>,
) -> ApiResult<(StatusCode, Json<ClientAddress>)> {
    let owner = AddressOwner::Client(client_id);
    let created = state.db.addresses().create(&ctx.tenant_id, &owner, &body).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// `PUT /clients/:client_id/addresses/:address_id`
pub async fn update(
    State(state): State<AppState>,
    ctx: AdminContext,
    Path((client_id, address_id)): Path<(String, String)>,
    ApiJson(body): ApiJson<AddressInput>,
) -> ApiResult<Json<ClientAddress>> {
    let owner = AddressOwner::Client(client_id);
    let updated = state
        .db
        .addresses()
        .update(&ctx.tenant_id, &owner, &address_id, &body)
        .await?;
    Ok(Json(updated))
}

/// `PUT /clients/:client_id/addresses/:address_id/default`
pub async fn set_default(
    State(state): State<AppState>,
    ctx: AdminContext,
    Path((client_id, address_id)): Path<(String, String)>,
) -> ApiResult<Json<ClientAddress>> {
    let owner = AddressOwner::Client(client_id);
    let address = state
        .db
        .addresses()
        .set_default(&ctx.tenant_id, &owner, &address_id)
        .await?;
    Ok(Json(address))
}

/// `DELETE /clients/:client_id/addresses/:address_id`
pub async fn delete(
    State(state): State<AppState>,
    ctx: AdminContext,
    Path((client_id, address_id)): Path<(String, String)>,
) -> ApiResult<StatusCode> {
    let owner = AddressOwner::Client(client_id);
    state
        .db
        .addresses()
        .delete(&ctx.tenant_id, &owner, &address_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
