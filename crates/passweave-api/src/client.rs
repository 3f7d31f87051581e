// Hand-crafted async HTTP client for NodePass-style master APIs.
//
// Base path: the configured API root (e.g. https://host:9090/api/v1)
// Auth: Authorization: Bearer <token>

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::Error;

// ── Wire types ────────────────────────────────────────────────────────

/// Body for the instance-creation endpoint: a single connection-string URL.
#[derive(Debug, Clone, Serialize)]
pub struct CreateInstanceRequest {
    pub url: String,
}

/// A provisioned instance echoed back by the endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatedInstance {
    /// Endpoint-assigned instance identifier.
    pub id: String,
    /// Echoed instance kind ("server" or "client").
    #[serde(rename = "type")]
    pub kind: String,
    /// Echoed connection string, when the endpoint returns it.
    #[serde(default)]
    pub url: Option<String>,
    /// Initial run status, when the endpoint returns it.
    #[serde(default)]
    pub status: Option<String>,
}

// ── Error response shape from the management API ─────────────────────

#[derive(Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

// ── Client ───────────────────────────────────────────────────────────

/// Async client for one management endpoint.
///
/// Bound to a single API root and bearer token at construction; the
/// submission layer builds one client per controller group.
pub struct ProvisionClient {
    http: reqwest::Client,
    base_url: Url,
}

impl ProvisionClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build from an API root and bearer token.
    ///
    /// Injects `Authorization: Bearer …` as a default header on every
    /// request, marked sensitive so it never shows up in debug logs.
    pub fn from_token(base_url: &str, token: &secrecy::SecretString) -> Result<Self, Error> {
        let mut headers = HeaderMap::new();
        let mut value = HeaderValue::from_str(&format!("Bearer {}", token.expose_secret()))
            .map_err(|e| Error::Authentication {
                message: format!("invalid token header value: {e}"),
            })?;
        value.set_sensitive(true);
        headers.insert(AUTHORIZATION, value);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;
        let base_url = Self::normalize_base_url(base_url)?;

        Ok(Self { http, base_url })
    }

    /// Wrap an existing `reqwest::Client` (caller manages auth headers).
    pub fn from_reqwest(base_url: &str, http: reqwest::Client) -> Result<Self, Error> {
        let base_url = Self::normalize_base_url(base_url)?;
        Ok(Self { http, base_url })
    }

    /// Ensure the base URL ends with a slash so relative joins work.
    fn normalize_base_url(raw: &str) -> Result<Url, Error> {
        let mut url = Url::parse(raw)?;
        let path = url.path().trim_end_matches('/').to_owned();
        url.set_path(&format!("{path}/"));
        Ok(url)
    }

    /// Join a relative path (e.g. `"instances"`) onto the base URL.
    fn url(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(path)?)
    }

    // ── Operations ───────────────────────────────────────────────────

    /// Create one tunnel instance from a compiled connection string.
    pub async fn create_instance(&self, instruction: &str) -> Result<CreatedInstance, Error> {
        let body = CreateInstanceRequest {
            url: instruction.to_owned(),
        };
        self.post("instances", &body).await
    }

    /// Fetch one instance by its endpoint-assigned identifier.
    pub async fn get_instance(&self, id: &str) -> Result<CreatedInstance, Error> {
        self.get(&format!("instances/{id}")).await
    }

    // ── HTTP verbs ───────────────────────────────────────────────────

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("GET {url}");

        let resp = self.http.get(url).send().await?;
        Self::handle_response(resp).await
    }

    async fn post<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("POST {url}");

        let resp = self.http.post(url).json(body).send().await?;
        Self::handle_response(resp).await
    }

    // ── Response handling ────────────────────────────────────────────

    async fn handle_response<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
        let status = resp.status();
        if status.is_success() {
            let body = resp.text().await?;
            serde_json::from_str(&body).map_err(|e| {
                // Truncate by characters: a byte cut could land inside a
                // multi-byte sequence and panic.
                let preview: String = body.chars().take(200).collect();
                Error::Deserialization {
                    message: format!("{e} (body preview: {preview:?})"),
                    body,
                }
            })
        } else {
            Err(Self::parse_error(status, resp).await)
        }
    }

    async fn parse_error(status: reqwest::StatusCode, resp: reqwest::Response) -> Error {
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Error::InvalidToken;
        }

        let raw = resp.text().await.unwrap_or_default();

        if let Ok(err) = serde_json::from_str::<ErrorResponse>(&raw) {
            if let Some(message) = err.error.or(err.message) {
                return Error::Api {
                    status: status.as_u16(),
                    message,
                };
            }
        }

        Error::Api {
            status: status.as_u16(),
            message: if raw.is_empty() {
                status.to_string()
            } else {
                raw
            },
        }
    }
}
