//! # API Error Type
//!
//! One error type for every handler, rendered as
//! `{"code": "ORDER_NOT_FOUND", "message": "Order not found: ..."}`.
//!
//! ## Status Mapping
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  CoreError  kind NotFound                     → 404                    │
//! │             kind Validation | Conflict        → 400                    │
//! │  DbError    UniqueViolation                   → 400  DUPLICATE         │
//! │             anything else                     → 500  (detail logged)   │
//! │  missing X-Tenant-Id / X-User-Id              → 401  UNAUTHENTICATED   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use dairy_core::{CoreError, ErrorKind};
use dairy_db::{DbError, ServiceError};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    #[serde(skip)]
    pub status: StatusCode,

    /// Machine-readable code, e.g. `INSUFFICIENT_STOCK`.
    pub code: String,

    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, code: impl Into<String>, message: impl Into<String>) -> Self {
        ApiError {
            status,
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn unauthenticated(message: impl Into<String>) -> Self {
        ApiError::new(StatusCode::UNAUTHORIZED, "UNAUTHENTICATED", message)
    }

    pub fn not_found(code: impl Into<String>, message: impl Into<String>) -> Self {
        ApiError::new(StatusCode::NOT_FOUND, code, message)
    }

    pub fn bad_request(code: impl Into<String>, message: impl Into<String>) -> Self {
        ApiError::new(StatusCode::BAD_REQUEST, code, message)
    }

    pub fn internal() -> Self {
        ApiError::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "INTERNAL",
            "An unexpected error occurred",
        )
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        let status = match err.kind() {
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Validation | ErrorKind::Conflict => StatusCode::BAD_REQUEST,
        };
        ApiError::new(status, err.code(), err.to_string())
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::UniqueViolation { field, .. } => {
                ApiError::bad_request("DUPLICATE", format!("{} already exists", field))
            }
            other => {
                tracing::error!(error = %other, "Database operation failed");
                ApiError::internal()
            }
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Domain(err) => err.into(),
            ServiceError::Db(err) => err.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use dairy_core::OrderStatus;

    #[test]
    fn test_domain_status_mapping() {
        let not_found: ApiError = CoreError::OrderNotFound("o1".into()).into();
        assert_eq!(not_found.status, StatusCode::NOT_FOUND);
        assert_eq!(not_found.code, "ORDER_NOT_FOUND");

        let conflict: ApiError = CoreError::OrderImmutable {
            order_id: "o1".into(),
            status: OrderStatus::Delivered,
        }
        .into();
        assert_eq!(conflict.status, StatusCode::BAD_REQUEST);

        let validation: ApiError = CoreError::EmptyCart.into();
        assert_eq!(validation.status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_storage_faults_are_hidden() {
        let err: ApiError = ServiceError::Db(DbError::QueryFailed("near \"SELEC\": syntax error".into())).into();
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!err.message.contains("SELEC"));
    }
}
