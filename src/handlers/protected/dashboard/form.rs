use axum::{
    extract::{Extension, Path, Query},
    response::Json,
};
use serde::Deserialize;

use crate::error::ApiError;
use crate::models::{CertificateId, DraftPatch};
use crate::middleware::{AdminSession, ApiResponse, ApiResult, DashboardUpdate};

#[derive(Debug, Deserialize)]
pub struct DeleteQuery {
    /// Answer to the delete confirmation; absent means not confirmed
    #[serde(default)]
    pub confirm: bool,
}

/// PUT /dashboard/form - edit one or more form fields
pub async fn put(
    Extension(session): Extension<AdminSession>,
    Json(patch): Json<DraftPatch>,
) -> ApiResult<DashboardUpdate> {
    if patch.is_empty() {
        return Err(ApiError::bad_request("No form fields provided"));
    }

    let mut dashboard = session.dashboard.dashboard.lock().await;
    dashboard.apply_form_patch(&patch);
    Ok(ApiResponse::success(DashboardUpdate::new(None, dashboard.snapshot())))
}

/// POST /dashboard/form - create, or update the record being edited
pub async fn submit(Extension(session): Extension<AdminSession>) -> ApiResult<DashboardUpdate> {
    let mut dashboard = session.dashboard.dashboard.lock().await;
    let editing = dashboard.form().is_editing();
    let notice = dashboard.submit().await?;

    let update = DashboardUpdate::new(Some(notice), dashboard.snapshot());
    if editing {
        Ok(ApiResponse::success(update))
    } else {
        Ok(ApiResponse::created(update))
    }
}

/// DELETE /dashboard/form - cancel editing and clear the form
pub async fn cancel(Extension(session): Extension<AdminSession>) -> ApiResult<DashboardUpdate> {
    let mut dashboard = session.dashboard.dashboard.lock().await;
    let notice = dashboard.cancel_edit();
    Ok(ApiResponse::success(DashboardUpdate::new(Some(notice), dashboard.snapshot())))
}

/// POST /dashboard/certificates/:id/edit - load a listed record into the form
pub async fn begin_edit(
    Path(id): Path<String>,
    Extension(session): Extension<AdminSession>,
) -> ApiResult<DashboardUpdate> {
    let mut dashboard = session.dashboard.dashboard.lock().await;
    dashboard.begin_edit(&id)?;
    Ok(ApiResponse::success(DashboardUpdate::new(None, dashboard.snapshot())))
}

/// DELETE /dashboard/certificates/:id?confirm=true - delete after confirmation
pub async fn delete(
    Path(id): Path<String>,
    Query(query): Query<DeleteQuery>,
    Extension(session): Extension<AdminSession>,
) -> ApiResult<DashboardUpdate> {
    let mut dashboard = session.dashboard.dashboard.lock().await;
    let notice = dashboard.delete(&CertificateId::new(id), &query.confirm).await?;
    Ok(ApiResponse::success(DashboardUpdate::new(Some(notice), dashboard.snapshot())))
}
