mod cli;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{print_completions, Commands, ConfigAction, OutputFormat};
use cubecloud::api::CloudClient;
use cubecloud::binder::load_deploy_auth;
use cubecloud::config::{self, CredentialResolver, Settings};
use cubecloud::prompt::TerminalPrompter;

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("Error: {err}");

        if std::env::var("CUBE_CLOUD_DEBUG").is_ok() {
            let mut source = err.source();
            while let Some(cause) = source {
                eprintln!("Caused by: {cause}");
                source = cause.source();
            }
        }

        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();
    init_tracing(cli.verbose);

    let settings = Settings {
        config_dir: cli.config_dir.clone(),
        project_dir: cli.project_dir.clone(),
        cloud_host: cli.cloud_host.clone(),
        deploy_auth: cli.deploy_auth.clone(),
    };

    match &cli.command {
        Commands::Completions { shell } => print_completions(*shell),
        Commands::Config { action } => handle_config(action, &settings)?,
        Commands::Status => handle_status(&settings, &cli.format)?,
        Commands::Auth { token } => handle_auth(token, &settings, cli.quiet).await?,
        Commands::Link { yes } => handle_link(*yes, &settings, &cli.format).await?,
        Commands::Deployments => handle_deployments(&settings, &cli.format).await?,
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("cubecloud=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn client_for(settings: &Settings) -> anyhow::Result<CloudClient> {
    Ok(CloudClient::new(settings.cloud_host.as_deref())?)
}

async fn handle_auth(token: &str, settings: &Settings, quiet: bool) -> anyhow::Result<()> {
    let client = client_for(settings)?;
    let store = settings.credential_store()?;
    let credentials = config::add_auth_token(&store, &client, token)
        .await
        .context("Failed to store auth token")?;
    if !quiet {
        println!(
            "Token saved to {} ({} host{})",
            store.path().display(),
            credentials.len(),
            if credentials.len() == 1 { "" } else { "s" }
        );
    }
    Ok(())
}

async fn handle_link(yes: bool, settings: &Settings, format: &OutputFormat) -> anyhow::Result<()> {
    let mut client = client_for(settings)?;
    let auth = load_deploy_auth(settings, &mut client, &TerminalPrompter::new(), !yes).await?;
    cli::format_link(&auth, format);
    Ok(())
}

async fn handle_deployments(settings: &Settings, format: &OutputFormat) -> anyhow::Result<()> {
    let mut client = client_for(settings)?;
    let auth = load_deploy_auth(settings, &mut client, &TerminalPrompter::new(), true).await?;
    let deployments = client.deployments(None).await?;
    cli::format_deployments(&deployments, auth.deployment_id.as_deref(), format);
    Ok(())
}

fn handle_status(settings: &Settings, format: &OutputFormat) -> anyhow::Result<()> {
    let credentials = match settings.deploy_auth() {
        Some(token) => CredentialResolver::env_credentials(token, None)?,
        None => settings
            .credential_store()?
            .load()
            .context("Failed to load credential store")?,
    };
    let binding = settings
        .project_binding()?
        .load()
        .context("Failed to load project binding")?;

    cli::format_status(&credentials, binding.as_ref(), format);
    Ok(())
}

fn handle_config(action: &ConfigAction, settings: &Settings) -> anyhow::Result<()> {
    match action {
        ConfigAction::Path => {
            println!("credentials: {}", settings.credential_store()?.path().display());
            println!("binding: {}", settings.project_binding()?.path().display());
        }
    }
    Ok(())
}
