use crate::error::{CloudError, Result};
use crate::types::{Deployment, ResolvedAuth};
use reqwest::{Client, Method, Response};
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_HOST: &str = "https://cubecloud.dev";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const DEPLOYMENTS_PATH: &str = "build/deploy/deployments";

#[derive(Debug, Deserialize)]
struct TokenResponse {
    error: Option<Value>,
    jwt: Option<String>,
}

pub struct CloudClient {
    client: Client,
    host: String,
    default_auth: Option<ResolvedAuth>,
}

impl CloudClient {
    /// `host` is the control plane used for token exchange; it does not
    /// affect authenticated requests, which go to the credential's own host.
    pub fn new(host: Option<&str>) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(CloudError::Network)?;

        Ok(Self {
            client,
            host: host
                .unwrap_or(DEFAULT_HOST)
                .trim_end_matches('/')
                .to_string(),
            default_auth: None,
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    /// Install the credential used by [`send`](Self::send) when the caller
    /// passes none.
    pub fn set_default_auth(&mut self, auth: ResolvedAuth) {
        self.default_auth = Some(auth);
    }

    pub fn default_auth(&self) -> Option<&ResolvedAuth> {
        self.default_auth.as_ref()
    }

    /// Send an authenticated request to the credential's host.
    ///
    /// `path` receives the bound deployment id (if any) and returns the path
    /// relative to the host. Fails with [`CloudError::AuthNotSet`] before any
    /// network traffic when neither `auth` nor a session default is present.
    pub async fn send<F>(
        &self,
        path: F,
        method: Method,
        auth: Option<&ResolvedAuth>,
        body: Option<&Value>,
    ) -> Result<Value>
    where
        F: FnOnce(Option<&str>) -> String,
    {
        let auth = auth
            .or(self.default_auth.as_ref())
            .ok_or(CloudError::AuthNotSet)?;

        let url = format!(
            "{}/{}",
            auth.url.trim_end_matches('/'),
            path(auth.deployment_id.as_deref())
        );
        debug!(method = method.as_str(), %url, "control plane request");

        let mut request = self
            .client
            .request(method, &url)
            .header("Authorization", auth.token())
            .header("Accept", "application/json");
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let (status, text) = read_body(response).await?;

        if !status.is_success() {
            return Err(CloudError::ControlPlane(format!("{status}: {text}")));
        }
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(|_| CloudError::ControlPlane(text))
    }

    /// Redeem an exchange code for a signed token.
    pub async fn exchange_token(&self, code: &str) -> Result<String> {
        let url = format!("{}/v1/token", self.host);
        debug!(%url, "exchanging token");

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&json!({ "token": code }))
            .send()
            .await?;
        let (status, text) = read_body(response).await?;

        let parsed: Option<TokenResponse> = serde_json::from_str(&text).ok();
        if let Some(error) = parsed.as_ref().and_then(|r| r.error.as_ref()) {
            let message = match error {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            return Err(CloudError::ControlPlane(message));
        }

        if !status.is_success() {
            return Err(CloudError::ControlPlane(format!("{status}: {text}")));
        }

        parsed
            .and_then(|r| r.jwt)
            .filter(|jwt| !jwt.is_empty())
            .ok_or_else(|| {
                CloudError::MalformedCredential("token exchange returned no token".into())
            })
    }

    /// List the deployments visible to `auth`'s host.
    pub async fn deployments(&self, auth: Option<&ResolvedAuth>) -> Result<Vec<Deployment>> {
        let response = self
            .send(|_| DEPLOYMENTS_PATH.to_string(), Method::GET, auth, None)
            .await?;

        if !response.is_array() {
            return Err(CloudError::ControlPlane(response.to_string()));
        }
        serde_json::from_value(response.clone())
            .map_err(|e| CloudError::ControlPlane(format!("{e}: {response}")))
    }
}

async fn read_body(response: Response) -> Result<(reqwest::StatusCode, String)> {
    let status = response.status();
    let text = response.text().await?;
    Ok((status, text))
}
