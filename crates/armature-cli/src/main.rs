//! Armature - ARM deployment reconciliation for function apps
//!
//! Usage:
//!   armature synth            # Print the deployment that would be submitted
//!   armature diff             # Compare against the previous deployment
//!   armature deploy           # Submit if anything changed

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use armature_core::config::{ServiceConfig, parse_service_toml};
use armature_core::manifest::Deployment;
use armature_core::provider::ArmClient;
use armature_core::reconcile::{DeploymentExecutor, DeploymentOutcome, inject_environment};
use armature_core::template::TemplateSynthesizer;

#[derive(Parser)]
#[command(name = "armature")]
#[command(about = "Declarative ARM deployments for function apps", long_about = None)]
struct Cli {
    /// Path to the service configuration
    #[arg(long, short, global = true, default_value = "armature.toml")]
    config: PathBuf,

    /// Deployment slot to target, overriding the configuration
    #[arg(long, global = true)]
    slot: Option<String>,

    /// Azure subscription ID
    #[arg(long, global = true, env = "AZURE_SUBSCRIPTION_ID")]
    subscription: Option<String>,

    /// Bearer token for the management API
    #[arg(long, global = true, env = "AZURE_ACCESS_TOKEN", hide_env_values = true)]
    access_token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the deployment and print it as JSON
    Synth {
        /// Write to a file instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Compare the deployment against the previously applied one
    Diff,

    /// Deploy if anything changed since the previous deployment
    Deploy,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "armature=info,armature_core=info,warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;

    match &cli.command {
        Commands::Synth { output } => run_synth(&config, output.as_deref()),
        Commands::Diff => run_diff(&cli, &config).await,
        Commands::Deploy => run_deploy(&cli, &config).await,
    }
}

fn load_config(cli: &Cli) -> Result<ServiceConfig> {
    let mut config = parse_service_toml(&cli.config)
        .with_context(|| format!("Failed to load {}", cli.config.display()))?;

    if let Some(slot) = &cli.slot {
        config.provider.deployment.slot = Some(slot.clone());
    }
    if let Some(subscription) = &cli.subscription {
        config.provider.subscription_id = Some(subscription.clone());
    }
    config.validate()?;
    Ok(config)
}

fn build_deployment(config: &ServiceConfig) -> Result<Deployment> {
    let deployment = TemplateSynthesizer::default().build(config)?;
    Ok(deployment)
}

fn arm_client(cli: &Cli, config: &ServiceConfig) -> Result<ArmClient> {
    let subscription = config
        .provider
        .subscription_id
        .clone()
        .context("No subscription: pass --subscription or set AZURE_SUBSCRIPTION_ID")?;
    let access_token = cli
        .access_token
        .clone()
        .context("No access token: set AZURE_ACCESS_TOKEN")?;

    Ok(ArmClient::new(
        subscription,
        config.resource_group(),
        access_token,
    )?)
}

fn run_synth(config: &ServiceConfig, output: Option<&Path>) -> Result<()> {
    let mut deployment = build_deployment(config)?;
    inject_environment(&mut deployment, config)?;

    let json = serde_json::to_string_pretty(&deployment)?;
    match output {
        Some(path) => {
            std::fs::write(path, json)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("Wrote deployment to {}", path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}

async fn run_diff(cli: &Cli, config: &ServiceConfig) -> Result<()> {
    let client = arm_client(cli, config)?;
    let deployment = build_deployment(config)?;

    let compared = DeploymentExecutor::new(&client, &client)
        .compare(deployment, config)
        .await?;

    let target = compared.target();
    if compared.is_unchanged() {
        println!(
            "No changes: {} in {} matches the generated template",
            target.deployment_name, target.resource_group
        );
    } else {
        println!(
            "Changes detected: {} in {} would be deployed",
            target.deployment_name, target.resource_group
        );
    }
    Ok(())
}

async fn run_deploy(cli: &Cli, config: &ServiceConfig) -> Result<()> {
    let client = arm_client(cli, config)?;
    let deployment = build_deployment(config)?;

    let outcome = DeploymentExecutor::new(&client, &client)
        .deploy(deployment, config)
        .await?;

    match outcome {
        DeploymentOutcome::Skipped => {
            println!("No changes detected, deployment skipped");
        }
        DeploymentOutcome::Succeeded(extended) => {
            println!(
                "Deployed {}",
                extended
                    .id
                    .or(extended.name)
                    .unwrap_or_else(|| config.deployment_name())
            );
        }
    }
    Ok(())
}
