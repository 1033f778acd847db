use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "cubecloud")]
#[command(author, version, about = "Cube Cloud CLI - Link projects to Cube Cloud deployments")]
pub struct Cli {
    /// Output format
    #[arg(long, global = true, default_value = "table")]
    pub format: OutputFormat,

    /// Deploy token (bypasses the stored credentials)
    #[arg(long, global = true, env = "CUBE_CLOUD_DEPLOY_AUTH", hide_env_values = true)]
    pub deploy_auth: Option<String>,

    /// Control plane used to exchange auth codes
    #[arg(long, global = true, env = "CUBE_CLOUD_HOST")]
    pub cloud_host: Option<String>,

    /// Directory holding config.json (defaults to ~/.cubecloud)
    #[arg(long, global = true, env = "CUBE_CLOUD_CONFIG_DIR")]
    pub config_dir: Option<PathBuf>,

    /// Project directory to bind (defaults to the current directory)
    #[arg(long, global = true)]
    pub project_dir: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress informational messages
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Store an auth token or exchange code for its host
    Auth {
        /// Token or one-time code from Cube Cloud
        token: String,
    },

    /// Bind the project directory to a deployment
    Link {
        /// Select a sole deployment without asking
        #[arg(short, long)]
        yes: bool,
    },

    /// List deployments for the project's host
    #[command(alias = "ls")]
    Deployments,

    /// Show stored hosts and the project binding
    Status,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show credential store and binding file paths
    Path,
}

#[derive(ValueEnum, Clone, Debug, Default)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Compact,
}
