#![allow(dead_code)]

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::{redirect::Policy, StatusCode};
use serde_json::{json, Value};

use cert_portal::app::{app, AppState};
use cert_portal::auth::StaticAuthenticator;
use cert_portal::config::AppConfig;
use cert_portal::store::MemoryStore;

pub const ADMIN_EMAIL: &str = "admin@example.com";
pub const ADMIN_PASSWORD: &str = "correct horse";

pub struct TestServer {
    pub base_url: String,
    pub store: Arc<MemoryStore>,
    /// Never follows redirects, so guard redirects stay observable
    pub client: reqwest::Client,
}

impl TestServer {
    /// Serve the real router on a free port, backed by a fresh in-memory store
    pub async fn start() -> Result<Self> {
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let store = Arc::new(MemoryStore::new());
        let authenticator = StaticAuthenticator::new(Some(ADMIN_EMAIL.into()), Some(ADMIN_PASSWORD.into()));
        let state = AppState::new(store.clone(), Arc::new(authenticator));
        let router = app(state, &AppConfig::from_env());

        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .context("failed to bind test port")?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });

        let client = reqwest::Client::builder().redirect(Policy::none()).build()?;
        let server = Self { base_url, store, client };
        server.wait_ready(Duration::from_secs(5)).await?;
        Ok(server)
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if let Ok(resp) = self.client.get(self.url("/health")).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Sign in with the configured admin credentials and return the token
    pub async fn login(&self) -> Result<String> {
        let res = self
            .client
            .post(self.url("/admin/login"))
            .json(&json!({ "email": ADMIN_EMAIL, "password": ADMIN_PASSWORD }))
            .send()
            .await?;
        anyhow::ensure!(res.status() == StatusCode::OK, "login failed: {}", res.status());

        let body: Value = res.json().await?;
        body["data"]["token"]
            .as_str()
            .map(str::to_string)
            .context("login response carried no token")
    }

    /// Send a gated request with the admin token as a bearer token
    pub async fn admin(
        &self,
        token: &str,
        method: reqwest::Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<(StatusCode, Value)> {
        let mut request = self.client.request(method, self.url(path)).bearer_auth(token);
        if let Some(body) = body {
            request = request.json(&body);
        }
        let res = request.send().await?;
        let status = res.status();
        let body = res.json::<Value>().await?;
        Ok((status, body))
    }
}

/// A complete, valid form
pub fn certificate_form(name: &str, serial: &str) -> Value {
    json!({
        "student_name": name,
        "student_email": "student@example.com",
        "course_name": "React Basics",
        "course_duration": "4 Weeks",
        "completion_status": "Completed",
        "badge_url": "",
        "serial_number": serial,
    })
}
