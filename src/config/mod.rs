mod auth;
mod store;

pub use auth::{add_auth_token, CredentialResolver};
pub use store::{CredentialStore, ProjectBinding};

use crate::error::{CloudError, Result};
use directories::BaseDirs;
use std::path::PathBuf;

pub const DEPLOY_AUTH_ENV: &str = "CUBE_CLOUD_DEPLOY_AUTH";

const CONFIG_DIR_NAME: &str = ".cubecloud";
const BINDING_FILE_NAME: &str = ".cubecloud";

/// Where state lives and which overrides are in effect for one invocation.
///
/// Nothing here reads the process environment; the CLI layer fills it from
/// flags and environment variables so tests can point it anywhere.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub config_dir: Option<PathBuf>,
    pub project_dir: Option<PathBuf>,
    pub cloud_host: Option<String>,
    pub deploy_auth: Option<String>,
}

impl Settings {
    pub fn default_config_dir() -> Option<PathBuf> {
        BaseDirs::new().map(|dirs| dirs.home_dir().join(CONFIG_DIR_NAME))
    }

    pub fn config_dir(&self) -> Result<PathBuf> {
        match &self.config_dir {
            Some(dir) => Ok(dir.clone()),
            None => Self::default_config_dir().ok_or_else(|| {
                CloudError::Config("Could not determine home directory".into())
            }),
        }
    }

    pub fn project_dir(&self) -> Result<PathBuf> {
        match &self.project_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(std::env::current_dir()?),
        }
    }

    pub fn credential_store(&self) -> Result<CredentialStore> {
        Ok(CredentialStore::new(self.config_dir()?))
    }

    pub fn project_binding(&self) -> Result<ProjectBinding> {
        Ok(ProjectBinding::new(self.project_dir()?.join(BINDING_FILE_NAME)))
    }

    /// The override token, ignoring an empty variable.
    pub fn deploy_auth(&self) -> Option<&str> {
        self.deploy_auth
            .as_deref()
            .map(str::trim)
            .filter(|token| !token.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_dirs_win() {
        let settings = Settings {
            config_dir: Some(PathBuf::from("/tmp/cfg")),
            project_dir: Some(PathBuf::from("/tmp/proj")),
            ..Settings::default()
        };
        assert_eq!(
            settings.credential_store().unwrap().path(),
            PathBuf::from("/tmp/cfg/config.json")
        );
        assert_eq!(
            settings.project_binding().unwrap().path(),
            PathBuf::from("/tmp/proj/.cubecloud")
        );
    }

    #[test]
    fn test_empty_deploy_auth_is_ignored() {
        let settings = Settings {
            deploy_auth: Some("  ".into()),
            ..Settings::default()
        };
        assert!(settings.deploy_auth().is_none());
    }
}
