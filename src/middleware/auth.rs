use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tracing::debug;

use crate::app::AppState;
use crate::auth::{Access, AdminToken, GuardState, ADMIN_TOKEN_KEY};
use crate::dashboard::DashboardHandle;

/// Admin context injected into every gated request
#[derive(Clone)]
pub struct AdminSession {
    pub token: AdminToken,
    pub dashboard: DashboardHandle,
}

/// Route guard: any request without an admin token is sent to the login page,
/// anything with one gets its mounted dashboard attached.
pub async fn admin_guard_middleware(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Response {
    let persisted = extract_admin_token(&headers);

    match GuardState::evaluate(persisted.as_deref()).into_access() {
        Access::Redirect(to) => {
            debug!(path = %request.uri().path(), "no admin token, redirecting to {}", to);
            Redirect::to(to).into_response()
        }
        Access::Render(token) => {
            let dashboard = state.sessions.open(&token).await;
            request.extensions_mut().insert(AdminSession { token, dashboard });
            next.run(request).await
        }
    }
}

/// Persisted admin token: the `adminToken` cookie, else a bearer token
pub fn extract_admin_token(headers: &HeaderMap) -> Option<String> {
    cookie_value(headers, ADMIN_TOKEN_KEY).or_else(|| bearer_token(headers))
}

fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|raw| raw.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_string())
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string())
}

/// `Set-Cookie` value persisting the token for the whole site
pub fn token_cookie(token: &AdminToken) -> String {
    format!("{}={}; Path=/; HttpOnly; SameSite=Lax", ADMIN_TOKEN_KEY, token.as_str())
}

/// `Set-Cookie` value removing the token
pub fn clear_token_cookie() -> String {
    format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", ADMIN_TOKEN_KEY)
}
