// handlers/public/auth/session.rs - POST /admin/logout

use axum::{
    extract::State,
    http::{header, HeaderMap},
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::app::AppState;
use crate::auth::AdminToken;
use crate::middleware::auth::{clear_token_cookie, extract_admin_token};
use crate::middleware::ApiResponse;

/// Drop the persisted token and unmount the dashboard it opened.
/// Succeeds whether or not a session existed.
pub async fn logout_post(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let closed = match extract_admin_token(&headers).and_then(AdminToken::new) {
        Some(token) => state.sessions.close(&token).await,
        None => false,
    };

    let body = ApiResponse::success(json!({
        "signed_out": true,
        "session_closed": closed,
        "redirect": "/admin",
    }));
    ([(header::SET_COOKIE, clear_token_cookie())], body).into_response()
}
