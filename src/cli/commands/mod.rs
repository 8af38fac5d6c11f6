pub mod auth;
pub mod cert;
pub mod verify;

use std::sync::Arc;

use crate::auth::{Access, AdminToken, GuardState};
use crate::cli::config::{load_environment_config, EnvironmentConfig};
use crate::config::config;
use crate::store::{self, CertificateStore};

/// Certificate store for this invocation, honoring a saved store URL
pub(crate) fn open_store(env: &EnvironmentConfig) -> anyhow::Result<Arc<dyn CertificateStore>> {
    let store_config = env.store_config(&config().store);
    Ok(store::connect(&store_config)?)
}

/// Route guard for admin commands: the persisted token must be present
pub(crate) fn require_admin() -> anyhow::Result<(EnvironmentConfig, AdminToken)> {
    let env = load_environment_config()?;
    match GuardState::evaluate(env.admin_token.as_deref()).into_access() {
        Access::Render(token) => Ok((env, token)),
        Access::Redirect(login) => Err(anyhow::anyhow!(
            "Not logged in as admin. Run `certctl auth login` first (login entry point: {})",
            login
        )),
    }
}
