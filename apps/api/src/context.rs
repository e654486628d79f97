//! Request context extractors.
//!
//! Authentication happens upstream (the storefront / admin BFF); this API
//! trusts the `X-Tenant-Id` and `X-User-Id` headers it forwards.

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::ApiError;

pub const TENANT_HEADER: &str = "X-Tenant-Id";
pub const USER_HEADER: &str = "X-User-Id";

fn header<'a>(parts: &'a Parts, name: &str) -> Option<&'a str> {
    parts
        .headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

/// Tenant of the request; the user is optional.
#[derive(Debug, Clone)]
pub struct TenantContext {
    pub tenant_id: String,
    pub user_id: Option<String>,
}

#[async_trait]
impl<S> FromRequestParts<S> for TenantContext
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let tenant_id = header(parts, TENANT_HEADER)
            .ok_or_else(|| ApiError::unauthenticated("Missing X-Tenant-Id header"))?;
        let user_id = header(parts, USER_HEADER);

        let span = tracing::Span::current();
        span.record("tenant_id", tenant_id);
        if let Some(user_id) = user_id {
            span.record("user_id", user_id);
        }

        Ok(TenantContext {
            tenant_id: tenant_id.to_string(),
            user_id: user_id.map(str::to_string),
        })
    }
}

/// Tenant and acting user, both required. Used by mutating admin routes.
#[derive(Debug, Clone)]
pub struct AdminContext {
    pub tenant_id: String,
    pub user_id: String,
}

#[async_trait]
impl<S> FromRequestParts<S> for AdminContext
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let TenantContext { tenant_id, user_id } = TenantContext::from_request_parts(parts, state).await?;
        let user_id = user_id.ok_or_else(|| ApiError::unauthenticated("Missing X-User-Id header"))?;

        Ok(AdminContext { tenant_id, user_id })
    }
}
