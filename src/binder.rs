//! Binding a project directory to a remote deployment.

use crate::api::CloudClient;
use crate::config::{CredentialResolver, ProjectBinding, Settings};
use crate::error::{CloudError, Result};
use crate::prompt::Prompter;
use crate::types::{AuthRecord, BindingRecord, CredentialMap, Deployment, ResolvedAuth};
use tracing::debug;

pub struct DeploymentBinder<'a> {
    resolver: CredentialResolver<'a>,
    binding: &'a ProjectBinding,
    confirm_single: bool,
}

impl<'a> DeploymentBinder<'a> {
    pub fn new(resolver: CredentialResolver<'a>, binding: &'a ProjectBinding) -> Self {
        Self {
            resolver,
            binding,
            confirm_single: true,
        }
    }

    /// Whether a sole deployment still needs to be picked from the list.
    /// Several deployments are always prompted for.
    pub fn confirm_single(mut self, confirm: bool) -> Self {
        self.confirm_single = confirm;
        self
    }

    /// Host, token and deployment for the current project.
    ///
    /// An existing binding is trusted without contacting the control plane.
    /// Otherwise a host is chosen, its deployments are listed, one is chosen,
    /// and the binding file is written before returning.
    pub async fn resolve_deployment_context(&self) -> Result<ResolvedAuth> {
        if let Some(binding) = self.binding.load()? {
            debug!(
                url = %binding.url,
                deployment_id = %binding.deployment_id,
                "project already bound"
            );
            let mut credentials = self.resolver.resolve(Some(&binding.url)).await?;
            let record = credentials.shift_remove(&binding.url).ok_or_else(|| {
                CloudError::CredentialMismatch {
                    expected: binding.url.clone(),
                    found: credentials.keys().cloned().collect::<Vec<_>>().join(", "),
                }
            })?;
            return Ok(
                ResolvedAuth::new(binding.url, record).with_deployment(binding.deployment_id)
            );
        }

        let credentials = self.resolver.resolve(None).await?;
        let (url, record) = self.select_host(credentials)?;
        let auth = ResolvedAuth::new(url, record);

        let deployments = self.resolver.client().deployments(Some(&auth)).await?;
        if deployments.is_empty() {
            return Err(CloudError::NoManagedDeployments(auth.url));
        }
        let deployment = self.select_deployment(deployments)?;

        let binding = BindingRecord {
            url: auth.url.clone(),
            deployment_id: deployment.id,
        };
        self.binding.save(&binding)?;

        Ok(auth.with_deployment(binding.deployment_id))
    }

    fn select_host(&self, mut credentials: CredentialMap) -> Result<(String, AuthRecord)> {
        let hosts: Vec<String> = credentials.keys().cloned().collect();
        let url = match hosts.as_slice() {
            [] => {
                return Err(CloudError::Internal(
                    "credential resolution returned no hosts".into(),
                ))
            }
            [only] => only.clone(),
            _ => {
                let index = self
                    .resolver
                    .prompter()
                    .select("Please select an organization", &hosts)?;
                hosts.get(index).cloned().ok_or_else(|| {
                    CloudError::Internal(format!("organization choice {index} out of range"))
                })?
            }
        };

        let record = credentials
            .shift_remove(&url)
            .ok_or_else(|| CloudError::Internal(format!("no credential for {url}")))?;
        Ok((url, record))
    }

    fn select_deployment(&self, mut deployments: Vec<Deployment>) -> Result<Deployment> {
        if deployments.len() == 1 && !self.confirm_single {
            return Ok(deployments.remove(0));
        }

        let names: Vec<String> = deployments.iter().map(|d| d.name.clone()).collect();
        let index = self
            .resolver
            .prompter()
            .select("Please select a deployment to deploy to", &names)?;
        if index >= deployments.len() {
            return Err(CloudError::Internal(format!(
                "deployment choice {index} out of range"
            )));
        }
        Ok(deployments.swap_remove(index))
    }
}

/// Resolve the current project's deployment context and install it as the
/// client's session default.
pub async fn load_deploy_auth(
    settings: &Settings,
    client: &mut CloudClient,
    prompter: &dyn Prompter,
    confirm_single: bool,
) -> Result<ResolvedAuth> {
    let store = settings.credential_store()?;
    let binding = settings.project_binding()?;

    let auth = {
        let resolver = CredentialResolver::new(&store, client, prompter)
            .with_env_token(settings.deploy_auth());
        DeploymentBinder::new(resolver, &binding)
            .confirm_single(confirm_single)
            .resolve_deployment_context()
            .await?
    };

    client.set_default_auth(auth.clone());
    Ok(auth)
}
