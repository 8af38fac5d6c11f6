use axum::{
    extract::{Extension, Path},
    response::Json,
};
use serde::Deserialize;

use crate::middleware::{AdminSession, ApiResponse, ApiResult, DashboardUpdate};
use crate::models::CertificateField;

#[derive(Debug, Deserialize)]
pub struct CellEdit {
    pub field: CertificateField,
    #[serde(default)]
    pub value: String,
}

/// POST /dashboard/batch/rows - append a blank row
pub async fn add_row(Extension(session): Extension<AdminSession>) -> ApiResult<DashboardUpdate> {
    let mut dashboard = session.dashboard.dashboard.lock().await;
    dashboard.add_batch_row();
    Ok(ApiResponse::created(DashboardUpdate::new(None, dashboard.snapshot())))
}

/// PATCH /dashboard/batch/rows/:index - set one cell of one row
pub async fn set_cell(
    Path(index): Path<usize>,
    Extension(session): Extension<AdminSession>,
    Json(edit): Json<CellEdit>,
) -> ApiResult<DashboardUpdate> {
    let mut dashboard = session.dashboard.dashboard.lock().await;
    dashboard.set_batch_cell(index, edit.field, edit.value)?;
    Ok(ApiResponse::success(DashboardUpdate::new(None, dashboard.snapshot())))
}

/// POST /dashboard/batch - insert every row in one request
pub async fn save(Extension(session): Extension<AdminSession>) -> ApiResult<DashboardUpdate> {
    let mut dashboard = session.dashboard.dashboard.lock().await;
    let notice = dashboard.save_batch().await?;
    Ok(ApiResponse::created(DashboardUpdate::new(Some(notice), dashboard.snapshot())))
}
