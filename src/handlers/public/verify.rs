// handlers/public/verify.rs - public verification page

use axum::{extract::State, response::Json};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::app::AppState;
use crate::middleware::{ApiResponse, ApiResult};
use crate::verify::{footer_text, VerificationLookup, VerifyOutcome};

#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    #[serde(default)]
    pub serial: String,
}

/// GET / - verification page descriptor
pub async fn home() -> ApiResult<Value> {
    Ok(ApiResponse::success(json!({
        "name": "Certificate Verification",
        "version": env!("CARGO_PKG_VERSION"),
        "form": {
            "action": "/verify",
            "fields": ["serial"],
        },
        "links": {
            "admin": "/admin",
        },
        "footer": footer_text(),
    })))
}

/// POST /verify - look up one certificate by its exact serial number
///
/// A missing certificate is a normal outcome (`status: not_found`), not an error.
pub async fn verify_post(
    State(state): State<AppState>,
    Json(payload): Json<VerifyRequest>,
) -> ApiResult<VerifyOutcome> {
    let mut lookup = VerificationLookup::new(state.store.clone());
    lookup.set_serial(payload.serial);
    Ok(ApiResponse::success(lookup.verify().await))
}
