// auth/mod.rs - admin route guard
//
// The guard is a presence check on a locally persisted token. Nothing here
// verifies the token, checks expiry or talks to a server; any non-empty value
// opens the dashboard.

pub mod authenticator;

use std::fmt;

pub use authenticator::{authenticator_for, AdminAuthenticator, AuthError, StaticAuthenticator};

/// Fixed key under which the admin token is persisted (cookie name / CLI config field)
pub const ADMIN_TOKEN_KEY: &str = "adminToken";

/// Login entry point that unauthorized renders are sent to
pub const LOGIN_ROUTE: &str = "/admin";

/// Opaque admin token. Never empty.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct AdminToken(String);

impl AdminToken {
    /// `None` for an empty value, which counts as "no token"
    pub fn new(token: impl Into<String>) -> Option<Self> {
        let token = token.into();
        (!token.is_empty()).then_some(Self(token))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AdminToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AdminToken([REDACTED])")
    }
}

/// The two states of the route guard
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardState {
    Authorized(AdminToken),
    Unauthorized,
}

/// What a protected route does when rendered
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    Render(AdminToken),
    Redirect(&'static str),
}

impl GuardState {
    pub fn evaluate(persisted: Option<&str>) -> Self {
        match persisted.and_then(AdminToken::new) {
            Some(token) => GuardState::Authorized(token),
            None => GuardState::Unauthorized,
        }
    }

    pub fn is_authorized(&self) -> bool {
        matches!(self, GuardState::Authorized(_))
    }

    pub fn into_access(self) -> Access {
        match self {
            GuardState::Authorized(token) => Access::Render(token),
            GuardState::Unauthorized => Access::Redirect(LOGIN_ROUTE),
        }
    }
}
