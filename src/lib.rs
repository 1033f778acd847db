//! Credential resolution and deployment binding for the Cube Cloud CLI.
//!
//! A command first needs a token for some control-plane host and, for most
//! commands, the deployment the current project is bound to:
//!
//! - [`config::CredentialResolver`] picks credentials from the environment,
//!   the per-user store, or an interactive prompt.
//! - [`token::normalize`] turns pasted exchange codes into host-bound tokens.
//! - [`binder::DeploymentBinder`] confirms or creates the project binding.
//! - [`api::CloudClient`] sends authenticated requests.

pub mod api;
pub mod binder;
pub mod config;
pub mod error;
pub mod prompt;
pub mod token;
pub mod types;

pub use error::{CloudError, Result};
