use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub store: StoreConfig,
    pub api: ApiConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Hosted PostgREST-style table API
    Rest,
    /// Process-local table, for development and tests
    Memory,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    pub url: Option<String>,
    pub api_key: String,
    pub table: String,
    pub timeout_secs: u64,
}

// Keep the API key out of logs
impl std::fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreConfig")
            .field("backend", &self.backend)
            .field("url", &self.url)
            .field("api_key", &"[REDACTED]")
            .field("table", &self.table)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub port: u16,
    pub enable_request_logging: bool,
    pub max_upload_bytes: usize,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub enable_cors: bool,
    pub cors_origins: Vec<String>,
    /// Credentials accepted by the in-memory authenticator
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
    /// Mounted admin dashboards kept at once; the least recently used is evicted
    pub max_admin_sessions: usize,
}

impl std::fmt::Debug for SecurityConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecurityConfig")
            .field("enable_cors", &self.enable_cors)
            .field("cors_origins", &self.cors_origins)
            .field("admin_email", &self.admin_email)
            .field("admin_password", &self.admin_password.as_ref().map(|_| "[REDACTED]"))
            .field("max_admin_sessions", &self.max_admin_sessions)
            .finish()
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Store overrides
        if let Ok(v) = env::var("CERT_STORE_URL") {
            if !v.trim().is_empty() {
                self.store.url = Some(v.trim().to_string());
                self.store.backend = StoreBackend::Rest;
            }
        }
        if let Ok(v) = env::var("CERT_STORE_BACKEND") {
            match v.to_ascii_lowercase().as_str() {
                "rest" => self.store.backend = StoreBackend::Rest,
                "memory" => self.store.backend = StoreBackend::Memory,
                other => tracing::warn!("ignoring unknown CERT_STORE_BACKEND '{}'", other),
            }
        }
        if let Ok(v) = env::var("CERT_STORE_API_KEY") {
            self.store.api_key = v;
        }
        if let Ok(v) = env::var("CERT_STORE_TABLE") {
            if !v.trim().is_empty() {
                self.store.table = v.trim().to_string();
            }
        }
        if let Ok(v) = env::var("CERT_STORE_TIMEOUT_SECS") {
            self.store.timeout_secs = v.parse().unwrap_or(self.store.timeout_secs);
        }

        // API overrides
        if let Some(port) = env::var("CERT_PORTAL_PORT")
            .ok()
            .or_else(|| env::var("PORT").ok())
            .and_then(|s| s.parse::<u16>().ok())
        {
            self.api.port = port;
        }
        if let Ok(v) = env::var("API_ENABLE_REQUEST_LOGGING") {
            self.api.enable_request_logging = v.parse().unwrap_or(self.api.enable_request_logging);
        }
        if let Ok(v) = env::var("API_MAX_UPLOAD_BYTES") {
            self.api.max_upload_bytes = v.parse().unwrap_or(self.api.max_upload_bytes);
        }

        // Security overrides
        if let Ok(v) = env::var("SECURITY_ENABLE_CORS") {
            self.security.enable_cors = v.parse().unwrap_or(self.security.enable_cors);
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v.split(',').map(|s| s.trim().to_string()).collect();
        }
        if let Ok(v) = env::var("ADMIN_EMAIL") {
            self.security.admin_email = Some(v);
        }
        if let Ok(v) = env::var("ADMIN_PASSWORD") {
            self.security.admin_password = Some(v);
        }
        if let Ok(v) = env::var("SECURITY_MAX_ADMIN_SESSIONS") {
            self.security.max_admin_sessions = v.parse().unwrap_or(self.security.max_admin_sessions);
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            store: StoreConfig {
                backend: StoreBackend::Memory,
                url: None,
                api_key: String::new(),
                table: "certificates".to_string(),
                timeout_secs: 30,
            },
            api: ApiConfig {
                port: 3000,
                enable_request_logging: true,
                max_upload_bytes: 10 * 1024 * 1024, // 10MB
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["http://localhost:3000".to_string(), "http://localhost:5173".to_string()],
                admin_email: None,
                admin_password: None,
                max_admin_sessions: 64,
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            store: StoreConfig {
                backend: StoreBackend::Rest,
                url: None,
                api_key: String::new(),
                table: "certificates".to_string(),
                timeout_secs: 15,
            },
            api: ApiConfig {
                port: 3000,
                enable_request_logging: true,
                max_upload_bytes: 5 * 1024 * 1024, // 5MB
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["https://staging.example.com".to_string()],
                admin_email: None,
                admin_password: None,
                max_admin_sessions: 64,
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            store: StoreConfig {
                backend: StoreBackend::Rest,
                url: None,
                api_key: String::new(),
                table: "certificates".to_string(),
                timeout_secs: 10,
            },
            api: ApiConfig {
                port: 3000,
                enable_request_logging: false,
                max_upload_bytes: 2 * 1024 * 1024, // 2MB
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["https://app.example.com".to_string()],
                admin_email: None,
                admin_password: None,
                max_admin_sessions: 256,
            },
        }
    }
}

/// Load `.env` from the working directory. A missing file is normal; any
/// other failure is handed back so it can be logged once tracing is up.
pub fn load_env_file() -> Option<dotenvy::Error> {
    env_file_error(dotenvy::dotenv().map(|_| ()))
}

fn env_file_error(result: dotenvy::Result<()>) -> Option<dotenvy::Error> {
    match result {
        Ok(()) => None,
        Err(e) if e.not_found() => None,
        Err(e) => Some(e),
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[macro_export]
macro_rules! is_production {
    () => {
        matches!($crate::config::CONFIG.environment, $crate::config::Environment::Production)
    };
}
