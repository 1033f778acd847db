use super::{CredentialStore, DEPLOY_AUTH_ENV};
use crate::api::CloudClient;
use crate::error::{CloudError, Result};
use crate::prompt::Prompter;
use crate::token::{self, decode_claims};
use crate::types::{AuthRecord, CredentialMap};
use tracing::debug;

/// Decides which credentials a command may use.
pub struct CredentialResolver<'a> {
    env_token: Option<&'a str>,
    store: &'a CredentialStore,
    client: &'a CloudClient,
    prompter: &'a dyn Prompter,
}

impl<'a> CredentialResolver<'a> {
    pub fn new(
        store: &'a CredentialStore,
        client: &'a CloudClient,
        prompter: &'a dyn Prompter,
    ) -> Self {
        Self {
            env_token: None,
            store,
            client,
            prompter,
        }
    }

    /// Token taken from the environment; when set, the store is never read
    /// or written.
    pub fn with_env_token(mut self, token: Option<&'a str>) -> Self {
        self.env_token = token;
        self
    }

    pub fn client(&self) -> &'a CloudClient {
        self.client
    }

    pub fn prompter(&self) -> &'a dyn Prompter {
        self.prompter
    }

    /// The single-host map for a token taken from the environment. The token
    /// is never exchanged and must name `expected_url` if one is given.
    pub fn env_credentials(token: &str, expected_url: Option<&str>) -> Result<CredentialMap> {
        let claims = decode_claims(token).map_err(|e| {
            CloudError::MalformedCredential(format!("token in {DEPLOY_AUTH_ENV}: {e}"))
        })?;

        if let Some(expected) = expected_url {
            if claims.url != expected {
                return Err(CloudError::CredentialMismatch {
                    expected: expected.to_string(),
                    found: claims.url,
                });
            }
        }

        let mut credentials = CredentialMap::new();
        credentials.insert(claims.url, AuthRecord::new(token));
        Ok(credentials)
    }

    /// Resolve candidate credentials, first match wins:
    ///
    /// 1. the environment token, which must name `expected_url` if one is given
    /// 2. the credential store, returned whole when non-empty
    /// 3. a prompted token, normalized and merged into the store
    ///
    /// The result always holds at least one host. Picking among several is
    /// left to the caller.
    pub async fn resolve(&self, expected_url: Option<&str>) -> Result<CredentialMap> {
        if let Some(env_token) = self.env_token {
            debug!("using credential from {DEPLOY_AUTH_ENV}");
            return Self::env_credentials(env_token, expected_url);
        }

        let credentials = self.store.load()?;
        if !credentials.is_empty() {
            debug!(hosts = credentials.len(), "using stored credentials");
            return Ok(credentials);
        }

        debug!("no stored credentials, prompting");
        let message = match expected_url {
            Some(url) => format!("Cube Cloud Auth Token for {url}"),
            None => "Cube Cloud Auth Token".to_string(),
        };
        let answer = self.prompter.input(&message)?;
        add_auth_token(self.store, self.client, &answer).await
    }
}

/// Normalize `token` and merge it into the store under its host.
pub async fn add_auth_token(
    store: &CredentialStore,
    client: &CloudClient,
    token: &str,
) -> Result<CredentialMap> {
    let normalized = token::normalize(client, token).await?;
    store.insert(normalized)
}
