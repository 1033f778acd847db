use crate::cli::{Cli, OutputFormat};
use chrono::{DateTime, Utc};
use clap::CommandFactory;
use clap_complete::Shell;
use colored::Colorize;
use cubecloud::token::decode_claims;
use cubecloud::types::{BindingRecord, CredentialMap, Deployment, ResolvedAuth};
use serde::Serialize;
use serde_json::json;
use tabled::settings::Style;
use tabled::{Table, Tabled};

#[derive(Tabled)]
struct DeploymentRow {
    #[tabled(rename = "")]
    bound: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "ID")]
    id: String,
}

impl DeploymentRow {
    fn from_deployment(deployment: &Deployment, bound_id: Option<&str>) -> Self {
        let bound = if bound_id == Some(deployment.id.as_str()) {
            "*".green().to_string()
        } else {
            String::new()
        };
        Self {
            bound,
            name: truncate(&deployment.name, 40),
            id: deployment.id.clone(),
        }
    }
}

#[derive(Tabled, Serialize)]
struct HostRow {
    #[tabled(rename = "Host")]
    url: String,
    #[tabled(rename = "Token")]
    token: String,
    #[tabled(rename = "Expires")]
    expires: String,
}

impl HostRow {
    fn new(url: &str, token: &str) -> Self {
        let expires = decode_claims(token)
            .ok()
            .and_then(|claims| claims.expires_at())
            .map(|dt| format_expiry(&dt))
            .unwrap_or_else(|| "-".to_string());
        Self {
            url: url.to_string(),
            token: mask(token),
            expires,
        }
    }
}

pub fn format_deployments(
    deployments: &[Deployment],
    bound_id: Option<&str>,
    format: &OutputFormat,
) {
    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(deployments).expect("serialization should not fail")
            );
        }
        OutputFormat::Compact => {
            for deployment in deployments {
                println!("{} {}", deployment.id, deployment.name);
            }
        }
        OutputFormat::Table => {
            let rows: Vec<DeploymentRow> = deployments
                .iter()
                .map(|d| DeploymentRow::from_deployment(d, bound_id))
                .collect();
            let table = Table::new(rows).with(Style::rounded()).to_string();
            println!("{table}");
        }
    }
}

pub fn format_link(auth: &ResolvedAuth, format: &OutputFormat) {
    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(auth).expect("serialization should not fail")
            );
        }
        OutputFormat::Compact => {
            println!("{} {}", auth.url, auth.deployment_id.as_deref().unwrap_or("-"));
        }
        OutputFormat::Table => {
            println!("{}: {}", "Host".dimmed(), auth.url);
            println!(
                "{}: {}",
                "Deployment".dimmed(),
                auth.deployment_id.as_deref().unwrap_or("-").bold()
            );
        }
    }
}

pub fn format_status(
    credentials: &CredentialMap,
    binding: Option<&BindingRecord>,
    format: &OutputFormat,
) {
    let hosts: Vec<HostRow> = credentials
        .iter()
        .map(|(url, record)| HostRow::new(url, &record.token))
        .collect();

    match format {
        OutputFormat::Json => {
            let value = json!({ "hosts": hosts, "binding": binding });
            println!(
                "{}",
                serde_json::to_string_pretty(&value).expect("serialization should not fail")
            );
        }
        OutputFormat::Compact => {
            for host in &hosts {
                println!("{}", host.url);
            }
            if let Some(binding) = binding {
                println!("bound {} {}", binding.url, binding.deployment_id);
            }
        }
        OutputFormat::Table => {
            if hosts.is_empty() {
                println!("{}", "No stored credentials".yellow());
            } else {
                let table = Table::new(hosts).with(Style::rounded()).to_string();
                println!("{table}");
            }
            match binding {
                Some(binding) => println!(
                    "{}: {} ({})",
                    "Bound to".dimmed(),
                    binding.deployment_id.bold(),
                    binding.url
                ),
                None => println!("{}: {}", "Bound to".dimmed(), "not linked".yellow()),
            }
        }
    }
}

pub fn print_completions(shell: Shell) {
    let mut cmd = Cli::command();
    clap_complete::generate(shell, &mut cmd, "cubecloud", &mut std::io::stdout());
}

fn mask(token: &str) -> String {
    let count = token.chars().count();
    if count < 12 {
        return "***".to_string();
    }
    let head: String = token.chars().take(4).collect();
    let tail: String = token.chars().skip(count - 4).collect();
    format!("{head}...{tail}")
}

fn format_expiry(dt: &DateTime<Utc>) -> String {
    let remaining = dt.signed_duration_since(Utc::now());

    if remaining.num_seconds() <= 0 {
        "expired".red().to_string()
    } else if remaining.num_hours() < 1 {
        format!("in {}m", remaining.num_minutes().max(1))
    } else if remaining.num_hours() < 24 {
        format!("in {}h", remaining.num_hours())
    } else if remaining.num_days() < 7 {
        format!("in {}d", remaining.num_days())
    } else {
        dt.format("%Y-%m-%d").to_string()
    }
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_len.saturating_sub(1)).collect();
        format!("{}…", truncated)
    }
}
