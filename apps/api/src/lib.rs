//! # Dairy Commerce API
//!
//! REST surface over the dairy-db services, shared by the storefront and
//! the admin console.
//!
//! ## Routes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Dairy Commerce API                             │
//! │                                                                         │
//! │  Storefront / admin                                                     │
//! │    POST   /orders/price                       cart recalculation        │
//! │    POST   /orders                             checkout                  │
//! │    GET    /orders/:id                         order + lines             │
//! │    PUT    /orders/:id                         full edit (admin)         │
//! │    PUT    /orders/:id/status                  lifecycle (admin)         │
//! │    DELETE /orders/:id                         hard delete (admin)       │
//! │    GET    /orders/:id/invoices                bill + payment rows       │
//! │                                                                         │
//! │  Admin                                                                  │
//! │    POST   /admin/invoices                     record a payment          │
//! │    POST   /admin/inventory/adjust             manual stock movement     │
//! │    GET    /admin/inventory/transactions       ledger history            │
//! │    *      /clients/:id/addresses[/:address]   address book              │
//! │                                                                         │
//! │    GET    /health                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration
//! Environment variables (a `.env` file is honoured):
//! - `HTTP_HOST` - bind host (default: 0.0.0.0)
//! - `HTTP_PORT` - bind port (default: 8080)
//! - `DATABASE_PATH` - SQLite file (default: ./data/dairy.db)
//! - `DB_MAX_CONNECTIONS` - pool size (default: 5)
//! - `LOG_FORMAT` - `pretty` or `json`

pub mod config;
pub mod context;
pub mod error;
pub mod extract;
pub mod handlers;

use axum::http::Request;
use axum::routing::{get, post, put};
use axum::Router;
use tower_http::trace::TraceLayer;

pub use config::{ApiConfig, LogFormat};
pub use error::{ApiError, ApiResult};

use dairy_db::Database;

/// Shared application state. Cheap to clone: the database wraps a pool.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
}

impl AppState {
    pub fn new(db: Database) -> Self {
        AppState { db }
    }
}

/// Builds the full router with request tracing.
pub fn build_router(state: AppState) -> Router {
    use handlers::{addresses, admin, orders};

    let orders = Router::new()
        .route("/orders", post(orders::create))
        .route("/orders/price", post(orders::price))
        .route(
            "/orders/:id",
            get(orders::get).put(orders::update).delete(orders::delete),
        )
        .route("/orders/:id/status", put(orders::update_status))
        .route("/orders/:id/invoices", get(orders::invoices));

    let admin = Router::new()
        .route("/admin/invoices", post(admin::record_payment))
        .route("/admin/inventory/adjust", post(admin::adjust_stock))
        .route("/admin/inventory/transactions", get(admin::list_transactions))
        .route(
            "/clients/:client_id/addresses",
            get(addresses::list).post(addresses::create),
        )
        .route(
            "/clients/:client_id/addresses/:address_id",
            put(addresses::update).delete(addresses::delete),
        )
        .route(
            "/clients/:client_id/addresses/:address_id/default",
            put(addresses::set_default),
        );

    Router::new()
        .route("/health", get(handlers::health))
        .merge(orders)
        .merge(admin)
        .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<_>| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                path = %request.uri().path(),
                tenant_id = tracing::field::Empty,
                user_id = tracing::field::Empty,
            )
        }))
        .with_state(state)
}
