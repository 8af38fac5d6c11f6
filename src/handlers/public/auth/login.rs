// handlers/public/auth/login.rs - admin login entry point

use axum::{
    extract::State,
    http::{header, HeaderMap},
    response::{IntoResponse, Json, Response},
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::app::AppState;
use crate::auth::GuardState;
use crate::error::ApiError;
use crate::middleware::auth::{extract_admin_token, token_cookie};
use crate::middleware::{ApiResponse, ApiResult};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// GET /admin - login page descriptor
pub async fn login_get(headers: HeaderMap) -> ApiResult<Value> {
    let persisted = extract_admin_token(&headers);
    let signed_in = GuardState::evaluate(persisted.as_deref()).is_authorized();

    Ok(ApiResponse::success(json!({
        "page": "admin_login",
        "form": {
            "action": "/admin/login",
            "fields": ["email", "password"],
        },
        "signed_in": signed_in,
        "dashboard": "/dashboard",
    })))
}

/// POST /admin/login - exchange credentials for the admin token
///
/// The token comes back in the body and as the `adminToken` cookie; either
/// one opens `/dashboard` afterwards.
pub async fn login_post(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Response, ApiError> {
    if payload.email.trim().is_empty() || payload.password.is_empty() {
        return Err(ApiError::bad_request("Email and password are required"));
    }

    let token = state
        .authenticator
        .sign_in(&payload.email, &payload.password)
        .await?;

    let body = ApiResponse::success(json!({
        "token": token.as_str(),
        "redirect": "/dashboard",
    }));
    Ok(([(header::SET_COOKIE, token_cookie(&token))], body).into_response())
}
