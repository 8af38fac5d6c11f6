use axum::{extract::Extension, response::Json};
use serde::Deserialize;

use crate::dashboard::DashboardSnapshot;
use crate::middleware::{AdminSession, ApiResponse, ApiResult, DashboardUpdate};

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    #[serde(default)]
    pub query: String,
}

/// GET /dashboard - current dashboard state
pub async fn get(Extension(session): Extension<AdminSession>) -> ApiResult<DashboardSnapshot> {
    let dashboard = session.dashboard.dashboard.lock().await;
    Ok(ApiResponse::success(dashboard.snapshot()))
}

/// POST /dashboard/refresh - refetch all certificates, newest first
pub async fn refresh(Extension(session): Extension<AdminSession>) -> ApiResult<DashboardUpdate> {
    let mut dashboard = session.dashboard.dashboard.lock().await;
    let notice = dashboard.refresh().await?;
    Ok(ApiResponse::success(DashboardUpdate::new(Some(notice), dashboard.snapshot())))
}

/// PUT /dashboard/search - filter the fetched list; never re-queries the store
pub async fn search(
    Extension(session): Extension<AdminSession>,
    Json(payload): Json<SearchRequest>,
) -> ApiResult<DashboardUpdate> {
    let mut dashboard = session.dashboard.dashboard.lock().await;
    dashboard.set_search(payload.query);
    Ok(ApiResponse::success(DashboardUpdate::new(None, dashboard.snapshot())))
}

/// POST /dashboard/visibility - show or hide the full table
pub async fn toggle_visibility(Extension(session): Extension<AdminSession>) -> ApiResult<DashboardUpdate> {
    let mut dashboard = session.dashboard.dashboard.lock().await;
    dashboard.toggle_visibility();
    Ok(ApiResponse::success(DashboardUpdate::new(None, dashboard.snapshot())))
}
