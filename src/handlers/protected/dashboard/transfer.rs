// CSV template download and bulk upload

use axum::{
    body::Bytes,
    extract::Extension,
    http::header,
    response::{IntoResponse, Response},
};

use crate::csv_io::{self, CSV_CONTENT_TYPE, TEMPLATE_FILENAME};
use crate::error::ApiError;
use crate::middleware::{AdminSession, ApiResponse, ApiResult, DashboardUpdate};

/// GET /dashboard/template - CSV header plus one example row, as a download
pub async fn template(Extension(_session): Extension<AdminSession>) -> Result<Response, ApiError> {
    let body = csv_io::template()?;
    let disposition = format!("attachment; filename=\"{}\"", TEMPLATE_FILENAME);

    Ok((
        [
            (header::CONTENT_TYPE, CSV_CONTENT_TYPE.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response())
}

/// POST /dashboard/import - raw CSV body, inserted as one bulk request
pub async fn import(Extension(session): Extension<AdminSession>, body: Bytes) -> ApiResult<DashboardUpdate> {
    if body.is_empty() {
        return Err(ApiError::bad_request("Upload a CSV file"));
    }

    let mut dashboard = session.dashboard.dashboard.lock().await;
    let notice = dashboard.import_csv(&body).await?;
    Ok(ApiResponse::created(DashboardUpdate::new(Some(notice), dashboard.snapshot())))
}
