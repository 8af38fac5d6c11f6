// app.rs - shared state and the HTTP router

use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, State},
    http::{HeaderValue, StatusCode},
    middleware::from_fn_with_state,
    response::{IntoResponse, Json},
    routing::{get, patch, post, put},
    Router,
};
use serde_json::json;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::warn;

use crate::auth::{authenticator_for, AdminAuthenticator};
use crate::config::AppConfig;
use crate::dashboard::SessionRegistry;
use crate::handlers;
use crate::middleware::admin_guard_middleware;
use crate::store::{self, CertificateStore, StoreError};

/// Everything a handler may need, cheap to clone per request
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn CertificateStore>,
    pub authenticator: Arc<dyn AdminAuthenticator>,
    pub sessions: Arc<SessionRegistry>,
}

impl AppState {
    pub fn new(store: Arc<dyn CertificateStore>, authenticator: Arc<dyn AdminAuthenticator>) -> Self {
        let sessions = SessionRegistry::new(store.clone());
        Self::with_sessions(store, authenticator, sessions)
    }

    pub fn with_sessions(
        store: Arc<dyn CertificateStore>,
        authenticator: Arc<dyn AdminAuthenticator>,
        sessions: SessionRegistry,
    ) -> Self {
        Self {
            store,
            authenticator,
            sessions: Arc::new(sessions),
        }
    }

    /// Store and authenticator selected by configuration
    pub fn from_config(config: &AppConfig) -> Result<Self, StoreError> {
        let store = store::connect(&config.store)?;
        let authenticator = authenticator_for(config)?;
        let sessions = SessionRegistry::with_capacity(store.clone(), config.security.max_admin_sessions);
        Ok(Self::with_sessions(store, authenticator, sessions))
    }
}

/// Router with the settings from `config`
pub fn app(state: AppState, config: &AppConfig) -> Router {
    let mut router = Router::new()
        // Public
        .route("/", get(handlers::public::home))
        .route("/verify", post(handlers::public::verify_post))
        .route("/health", get(health))
        .merge(admin_routes())
        // Gated
        .merge(dashboard_routes(state.clone()))
        .fallback(not_found)
        .layer(DefaultBodyLimit::max(config.api.max_upload_bytes));

    if config.api.enable_request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }
    if config.security.enable_cors {
        router = router.layer(cors_layer(&config.security.cors_origins));
    }

    router.with_state(state)
}

fn admin_routes() -> Router<AppState> {
    use handlers::public::auth;

    Router::new()
        .route("/admin", get(auth::login_get))
        .route("/admin/login", post(auth::login_post))
        .route("/admin/logout", post(auth::logout_post))
}

fn dashboard_routes(state: AppState) -> Router<AppState> {
    use handlers::protected::dashboard as d;

    Router::new()
        .route("/dashboard", get(d::dashboard_get))
        .route("/dashboard/refresh", post(d::dashboard_refresh))
        .route("/dashboard/search", put(d::dashboard_search))
        .route("/dashboard/visibility", post(d::dashboard_visibility))
        // Single-record form
        .route(
            "/dashboard/form",
            put(d::form_put).post(d::form_submit).delete(d::form_cancel),
        )
        .route("/dashboard/certificates/:id/edit", post(d::certificate_edit))
        .route("/dashboard/certificates/:id", axum::routing::delete(d::certificate_delete))
        // Batch editor
        .route("/dashboard/batch", post(d::batch_save))
        .route("/dashboard/batch/rows", post(d::batch_add_row))
        .route("/dashboard/batch/rows/:index", patch(d::batch_set_cell))
        // CSV
        .route("/dashboard/template", get(d::csv_template))
        .route("/dashboard/import", post(d::csv_import))
        .route_layer(from_fn_with_state(state, admin_guard_middleware))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("ignoring invalid CORS origin {:?}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(allowed)
        .allow_methods(tower_http::cors::Any)
        .allow_headers(tower_http::cors::Any)
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.store.health_check().await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "store": "ok"
                }
            })),
        ),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "success": false,
                "error": "certificate store unavailable",
                "data": {
                    "status": "degraded",
                    "timestamp": now,
                    "store_error": e.to_string()
                }
            })),
        ),
    }
}

async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": true,
            "message": "404 - Page Not Found",
            "code": "NOT_FOUND",
            "links": { "home": "/" }
        })),
    )
}
