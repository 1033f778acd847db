use thiserror::Error;

#[derive(Error, Debug)]
pub enum CloudError {
    #[error("Malformed credential: {0}")]
    MalformedCredential(String),

    #[error("Credential is for {found} but this project is bound to {expected}")]
    CredentialMismatch { expected: String, found: String },

    #[error("Auth isn't set. Run 'cubecloud link' or pass an explicit credential")]
    AuthNotSet,

    #[error("{0} doesn't have any managed deployments. Please create one.")]
    NoManagedDeployments(String),

    #[error("Control plane error: {0}")]
    ControlPlane(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Prompt failed: {0}")]
    Prompt(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CloudError>;
