use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Stored credentials keyed by control-plane host URL, in file order.
pub type CredentialMap = IndexMap<String, AuthRecord>;

/// A signed token whose `url` claim names the host it is valid for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthRecord {
    pub token: String,
}

impl AuthRecord {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

/// Decoded token payload. Only `url` is required; everything else is kept
/// as-is in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub url: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Claims {
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        let exp = self.extra.get("exp")?.as_i64()?;
        DateTime::from_timestamp(exp, 0)
    }
}

/// The project directory's association with a remote deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BindingRecord {
    pub url: String,
    pub deployment_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deployment {
    pub id: String,
    pub name: String,
}

/// Credential plus target for the duration of one command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedAuth {
    pub url: String,
    #[serde(skip)]
    pub record: AuthRecord,
    pub deployment_id: Option<String>,
}

impl ResolvedAuth {
    pub fn new(url: impl Into<String>, record: AuthRecord) -> Self {
        Self {
            url: url.into(),
            record,
            deployment_id: None,
        }
    }

    pub fn with_deployment(mut self, deployment_id: impl Into<String>) -> Self {
        self.deployment_id = Some(deployment_id.into());
        self
    }

    pub fn token(&self) -> &str {
        &self.record.token
    }
}
