//! Typed client for the hosted table API (PostgREST dialect).
//!
//! | Operation | Request |
//! |-----------|---------|
//! | select all | `GET /rest/v1/{table}?select=*&order=created_at.desc` |
//! | select single | `GET /rest/v1/{table}?select=*&{col}=eq.{value}` with the single-object `Accept` header |
//! | insert | `POST /rest/v1/{table}` with a JSON array body |
//! | update | `PATCH /rest/v1/{table}?id=eq.{id}` |
//! | delete | `DELETE /rest/v1/{table}?id=eq.{id}` |
//! | sign in | `POST /auth/v1/token?grant_type=password` |

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info};
use url::Url;

use super::{CertificateStore, StoreError};
use crate::auth::{AdminAuthenticator, AdminToken, AuthError};
use crate::config::StoreConfig;
use crate::filter::{EqFilter, OrderBy};
use crate::models::{Certificate, CertificateId, NewCertificate};

const REST_PREFIX: &str = "rest/v1";
const AUTH_TOKEN_PATH: &str = "auth/v1/token";

/// Makes the API answer with one object, or an error unless exactly one row matched.
const SINGLE_OBJECT: &str = "application/vnd.pgrst.object+json";

/// Client for the hosted `certificates` table.
#[derive(Debug, Clone)]
pub struct RestStore {
    http: reqwest::Client,
    table_url: Url,
}

impl RestStore {
    pub fn new(config: &StoreConfig) -> Result<Self, StoreError> {
        let table_url = base_url(config)?
            .join(&format!("{}/{}", REST_PREFIX, config.table))
            .map_err(|e| StoreError::Config(format!("invalid table URL: {}", e)))?;

        Ok(Self {
            http: build_client(config)?,
            table_url,
        })
    }

    pub fn table_url(&self) -> &Url {
        &self.table_url
    }

    fn endpoint(&self, method: &str) -> String {
        format!("{} {}", method, self.table_url.path())
    }
}

#[async_trait]
impl CertificateStore for RestStore {
    async fn select_all(&self, order: &OrderBy) -> Result<Vec<Certificate>, StoreError> {
        let endpoint = self.endpoint("GET");
        let request = self
            .http
            .get(self.table_url.clone())
            .query(&[("select", "*".to_string()), ("order", order.to_query_value())]);

        let resp = send(&endpoint, request).await?;
        decode(&endpoint, resp).await
    }

    async fn select_single(&self, filter: &EqFilter) -> Result<Certificate, StoreError> {
        let endpoint = self.endpoint("GET");
        let request = self
            .http
            .get(self.table_url.clone())
            .query(&[("select".to_string(), "*".to_string()), filter.to_query_pair()])
            .header(ACCEPT, SINGLE_OBJECT);

        let resp = send(&endpoint, request).await?;
        decode(&endpoint, resp).await
    }

    async fn insert(&self, rows: &[NewCertificate]) -> Result<Vec<Certificate>, StoreError> {
        let endpoint = self.endpoint("POST");
        let request = self
            .http
            .post(self.table_url.clone())
            .header("Prefer", "return=representation")
            .json(rows);

        let resp = send(&endpoint, request).await?;
        let inserted: Vec<Certificate> = decode(&endpoint, resp).await?;
        info!(count = inserted.len(), "inserted certificates");
        Ok(inserted)
    }

    async fn update(&self, id: &CertificateId, row: &NewCertificate) -> Result<(), StoreError> {
        let endpoint = self.endpoint("PATCH");
        let request = self
            .http
            .patch(self.table_url.clone())
            .query(&[EqFilter::id(id.as_str()).to_query_pair()])
            .header("Prefer", "return=minimal")
            .json(row);

        send(&endpoint, request).await?;
        info!(%id, "updated certificate");
        Ok(())
    }

    async fn delete(&self, id: &CertificateId) -> Result<(), StoreError> {
        let endpoint = self.endpoint("DELETE");
        let request = self
            .http
            .delete(self.table_url.clone())
            .query(&[EqFilter::id(id.as_str()).to_query_pair()]);

        send(&endpoint, request).await?;
        info!(%id, "deleted certificate");
        Ok(())
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        let endpoint = self.endpoint("GET");
        let request = self
            .http
            .get(self.table_url.clone())
            .query(&[("select", "id"), ("limit", "1")]);

        send(&endpoint, request).await.map(|_| ())
    }
}

/// Password sign-in against the hosted auth service.
#[derive(Debug, Clone)]
pub struct RestAuthenticator {
    http: reqwest::Client,
    token_url: Url,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

impl RestAuthenticator {
    pub fn new(config: &StoreConfig) -> Result<Self, StoreError> {
        let token_url = base_url(config)?
            .join(AUTH_TOKEN_PATH)
            .map_err(|e| StoreError::Config(format!("invalid auth URL: {}", e)))?;

        Ok(Self {
            http: build_client(config)?,
            token_url,
        })
    }
}

#[async_trait]
impl AdminAuthenticator for RestAuthenticator {
    async fn sign_in(&self, email: &str, password: &str) -> Result<AdminToken, AuthError> {
        let endpoint = format!("POST {}", self.token_url.path());
        let request = self
            .http
            .post(self.token_url.clone())
            .query(&[("grant_type", "password")])
            .json(&json!({ "email": email, "password": password }));

        let resp = send(&endpoint, request).await.map_err(|e| match e {
            StoreError::Api { status, message, .. } if (400..500).contains(&status) => {
                AuthError::Rejected(message)
            }
            other => AuthError::Store(other),
        })?;

        let body: TokenResponse = decode(&endpoint, resp).await?;
        let token = AdminToken::new(body.access_token)
            .ok_or_else(|| AuthError::Rejected("auth service returned an empty access token".to_string()))?;

        info!(email, "admin signed in");
        Ok(token)
    }
}

fn base_url(config: &StoreConfig) -> Result<Url, StoreError> {
    let raw = config
        .url
        .as_deref()
        .ok_or_else(|| StoreError::Config("CERT_STORE_URL is not set".to_string()))?;

    let mut url = Url::parse(raw)
        .map_err(|e| StoreError::Config(format!("invalid CERT_STORE_URL '{}': {}", raw, e)))?;

    // Url::join replaces the last segment unless the base ends with a slash
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

fn build_client(config: &StoreConfig) -> Result<reqwest::Client, StoreError> {
    let mut headers = HeaderMap::new();
    if !config.api_key.is_empty() {
        let invalid = || StoreError::Config("CERT_STORE_API_KEY contains invalid header characters".to_string());
        let key = HeaderValue::from_str(&config.api_key).map_err(|_| invalid())?;
        let bearer = HeaderValue::from_str(&format!("Bearer {}", config.api_key)).map_err(|_| invalid())?;
        headers.insert("apikey", key);
        headers.insert(AUTHORIZATION, bearer);
    }

    reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .default_headers(headers)
        .build()
        .map_err(|e| StoreError::Config(format!("failed to build HTTP client: {}", e)))
}

/// Error object returned by the table API or the auth service
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    msg: Option<String>,
    error_description: Option<String>,
    error: Option<String>,
    code: Option<Value>,
    error_code: Option<String>,
}

impl ErrorBody {
    fn message(&self) -> Option<String> {
        self.message
            .clone()
            .or_else(|| self.msg.clone())
            .or_else(|| self.error_description.clone())
            .or_else(|| self.error.clone())
    }

    fn code(&self) -> Option<String> {
        match &self.code {
            Some(Value::String(code)) => Some(code.clone()),
            Some(Value::Number(n)) => self.error_code.clone().or_else(|| Some(n.to_string())),
            _ => self.error_code.clone(),
        }
    }
}

async fn send(endpoint: &str, request: RequestBuilder) -> Result<Response, StoreError> {
    let resp = request.send().await.map_err(|e| StoreError::Http {
        endpoint: endpoint.to_string(),
        source: e,
    })?;

    if resp.status().is_success() {
        return Ok(resp);
    }

    let status = resp.status();
    let body = resp.text().await.unwrap_or_default();
    let parsed = serde_json::from_str::<ErrorBody>(&body).ok();

    let message = parsed
        .as_ref()
        .and_then(ErrorBody::message)
        .unwrap_or_else(|| {
            if body.trim().is_empty() {
                status.canonical_reason().unwrap_or("request failed").to_string()
            } else {
                body.clone()
            }
        });
    let code = parsed.as_ref().and_then(ErrorBody::code);

    debug!(endpoint, status = status.as_u16(), ?code, "store request failed");
    Err(StoreError::Api {
        endpoint: endpoint.to_string(),
        status: status.as_u16(),
        message,
        code,
    })
}

async fn decode<T: DeserializeOwned>(endpoint: &str, resp: Response) -> Result<T, StoreError> {
    resp.json().await.map_err(|e| StoreError::Deserialization {
        endpoint: endpoint.to_string(),
        source: e,
    })
}
