//! REST API implementation for the intake service

pub mod admin;
pub mod handlers;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{delete, get, post},
    Router,
};
use serde_json::json;
use sqlx::SqlitePool;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::error;

use crate::Error;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Server port
    pub port: u16,
}

impl AppState {
    pub fn new(db: SqlitePool, port: u16) -> Self {
        Self { db, port }
    }
}

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check (no prefix for health endpoint)
        .route("/health", get(health_check))
        // API v1 routes
        .nest(
            "/api/v1",
            Router::new()
                // Request intake
                .route("/requests/quote", post(handlers::quote))
                .route("/requests", post(handlers::submit))
                // Admin: blacklist
                .route(
                    "/organizations/:org/blacklist",
                    get(admin::list_blacklist).post(admin::add_blacklist),
                )
                .route(
                    "/organizations/:org/blacklist/:id",
                    delete(admin::delete_blacklist),
                )
                // Admin: music library (boundary list)
                .route(
                    "/organizations/:org/library",
                    get(admin::list_library).post(admin::add_library),
                )
                .route(
                    "/organizations/:org/library/:id",
                    delete(admin::delete_library),
                )
                // Admin: pricing overrides
                .route(
                    "/organizations/:org/pricing-rules",
                    get(admin::list_pricing_rules).post(admin::add_pricing_rule),
                )
                .route(
                    "/organizations/:org/pricing-rules/:id",
                    delete(admin::delete_pricing_rule),
                )
                // Admin: singleton configs
                .route(
                    "/organizations/:org/duplicate-rules",
                    get(admin::get_duplicate_rules).put(admin::put_duplicate_rules),
                )
                .route(
                    "/organizations/:org/library-settings",
                    get(admin::get_library_settings).put(admin::put_library_settings),
                ),
        )
        // Enable CORS for local access
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint
async fn health_check(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "module": "spinreq-intake",
        "version": env!("CARGO_PKG_VERSION"),
        "port": state.port,
    }))
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = match &self {
            Error::BadRequest(_) => StatusCode::BAD_REQUEST,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Config(_) | Error::Database(_) | Error::Common(_) | Error::Internal(_) => {
                error!("Request failed: {}", self);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}
