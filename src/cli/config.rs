use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::auth::ADMIN_TOKEN_KEY;
use crate::config::{StoreBackend, StoreConfig};

/// Persisted CLI state (`env.json`)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnvironmentConfig {
    /// Overrides CERT_STORE_URL for every command
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_url: Option<String>,

    /// The persisted admin token; its presence is what opens admin commands
    #[serde(default, rename = "adminToken", skip_serializing_if = "Option::is_none")]
    pub admin_token: Option<String>,
}

impl EnvironmentConfig {
    /// Store settings from the environment, with the saved URL applied on top
    pub fn store_config(&self, base: &StoreConfig) -> StoreConfig {
        let mut store = base.clone();
        if let Some(url) = &self.store_url {
            store.url = Some(url.clone());
            store.backend = StoreBackend::Rest;
        }
        store
    }
}

pub fn get_config_dir() -> anyhow::Result<PathBuf> {
    let config_dir = if let Ok(custom_dir) = std::env::var("CERTCTL_CONFIG_DIR") {
        PathBuf::from(custom_dir)
    } else {
        let home = std::env::var("HOME").map_err(|_| anyhow::anyhow!("HOME environment variable not set"))?;
        PathBuf::from(home).join(".config").join("certportal").join("cli")
    };

    if !config_dir.exists() {
        fs::create_dir_all(&config_dir)?;
    }

    Ok(config_dir)
}

pub fn load_environment_config() -> anyhow::Result<EnvironmentConfig> {
    let env_file = get_config_dir()?.join("env.json");

    if !env_file.exists() {
        return Ok(EnvironmentConfig::default());
    }

    let content = fs::read_to_string(&env_file)?;
    let config: EnvironmentConfig = serde_json::from_str(&content)
        .map_err(|e| anyhow::anyhow!("{} is not valid: {}", env_file.display(), e))?;
    Ok(config)
}

pub fn save_environment_config(config: &EnvironmentConfig) -> anyhow::Result<()> {
    let env_file = get_config_dir()?.join("env.json");

    let content = serde_json::to_string_pretty(config)?;
    fs::write(env_file, content)?;
    Ok(())
}
