use crate::error::{CloudError, Result};
use crate::token::{decode_claims, NormalizedToken};
use crate::types::{BindingRecord, CredentialMap};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

const CONFIG_FILE_NAME: &str = "config.json";

/// Per-user credentials, one JSON object keyed by host URL.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    pub fn new(config_dir: impl Into<PathBuf>) -> Self {
        Self {
            path: config_dir.into().join(CONFIG_FILE_NAME),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load every stored credential. A missing file is an empty store.
    ///
    /// Each token's `url` claim must match the key it is stored under;
    /// anything else means the file was edited or corrupted.
    pub fn load(&self) -> Result<CredentialMap> {
        if !self.path.exists() {
            return Ok(CredentialMap::new());
        }

        let contents = std::fs::read_to_string(&self.path)?;
        let credentials: CredentialMap = serde_json::from_str(&contents)?;

        for (url, record) in &credentials {
            let claims = decode_claims(&record.token).map_err(|e| {
                CloudError::Config(format!(
                    "Corrupt credential for {url} in {}: {e}",
                    self.path.display()
                ))
            })?;
            if &claims.url != url {
                return Err(CloudError::Config(format!(
                    "Corrupt credential in {}: token for {} stored under {url}",
                    self.path.display(),
                    claims.url
                )));
            }
        }

        Ok(credentials)
    }

    pub fn save(&self, credentials: &CredentialMap) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        write_json_atomic(&self.path, credentials)
    }

    /// Reload, merge `token` in under its own host, and save the whole map.
    pub fn insert(&self, token: NormalizedToken) -> Result<CredentialMap> {
        let mut credentials = self.load()?;
        debug!(url = %token.url, "storing credential");
        credentials.insert(token.url, token.record);
        self.save(&credentials)?;
        Ok(credentials)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PartialBinding {
    url: Option<String>,
    deployment_id: Option<String>,
}

/// The binding file of one project directory.
#[derive(Debug, Clone)]
pub struct ProjectBinding {
    path: PathBuf,
}

impl ProjectBinding {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `None` unless the file exists and names both a host and a deployment.
    pub fn load(&self) -> Result<Option<BindingRecord>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let contents = std::fs::read_to_string(&self.path)?;
        let partial: PartialBinding = serde_json::from_str(&contents)?;

        match (partial.url, partial.deployment_id) {
            (Some(url), Some(deployment_id)) if !url.is_empty() && !deployment_id.is_empty() => {
                Ok(Some(BindingRecord { url, deployment_id }))
            }
            _ => Ok(None),
        }
    }

    pub fn save(&self, binding: &BindingRecord) -> Result<()> {
        debug!(url = %binding.url, deployment_id = %binding.deployment_id, "writing binding");
        write_json_atomic(&self.path, binding)
    }
}

fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let contents = serde_json::to_string_pretty(value)?;

    let file_name = path
        .file_name()
        .ok_or_else(|| CloudError::Config(format!("Invalid path: {}", path.display())))?;
    let mut tmp_name = file_name.to_os_string();
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(tmp_name);

    let written =
        std::fs::write(&tmp_path, contents).and_then(|()| std::fs::rename(&tmp_path, path));
    if let Err(err) = written {
        let _ = std::fs::remove_file(&tmp_path);
        return Err(err.into());
    }
    Ok(())
}
