//! Prepdesk - command-line host for the session core.
//!
//! Loads settings, opens the session file, wires the runtime and runs one
//! command against the API.

mod cli;
mod navigator;

use std::sync::Arc;

use clap::Parser;
use prepdesk_application::ClientRuntime;
use prepdesk_domain::{ApiRequest, Credentials, Registration, SessionState};
use prepdesk_infrastructure::{FileKeyValueStore, ReqwestHttpClient, SettingsLoader};
use tracing::debug;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::{Cli, Command};
use crate::navigator::ConsoleNavigator;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut loader = SettingsLoader::new();
    if let Some(path) = &cli.config {
        loader = loader.with_file(path);
    }
    let mut settings = loader.load()?;
    if let Some(base_url) = cli.base_url {
        settings.base_url = base_url;
    }

    let storage_path = SettingsLoader::storage_path(&settings)?;
    debug!(path = %storage_path.display(), "using session file");
    let store = Arc::new(FileKeyValueStore::open(storage_path)?);
    let http = Arc::new(ReqwestHttpClient::from_settings(&settings)?);

    let runtime = ClientRuntime::new(
        http,
        store,
        Arc::new(ConsoleNavigator),
        settings.retry_policy(),
    );
    runtime.session.initialize();

    run(&runtime, cli.command).await
}

async fn run(runtime: &ClientRuntime, command: Command) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Command::Login {
            identifier,
            password,
        } => {
            let user = runtime
                .session
                .login(&Credentials::new(identifier, password))
                .await?;
            println!("Signed in as {}", user.identifier);
        }
        Command::Register {
            name,
            email,
            password,
            phone,
        } => {
            let receipt = runtime
                .session
                .register(&Registration {
                    name,
                    email,
                    password,
                    phone,
                })
                .await?;
            println!(
                "Account created for {}. Check {} to verify it before signing in.",
                receipt.name, receipt.email
            );
        }
        Command::Logout => {
            runtime.session.logout().await;
            println!("Signed out");
        }
        Command::Whoami => match runtime.session.state() {
            SessionState::Authenticated { user } => {
                println!("{}", serde_json::to_string_pretty(&user)?);
            }
            _ => println!("Not signed in"),
        },
        Command::Profile => {
            let user = runtime.session.refresh_profile().await?;
            println!("{}", serde_json::to_string_pretty(&user)?);
        }
        Command::Get { path } => {
            let response = runtime.client.send(ApiRequest::get(path)).await?;
            println!("{}", response.text());
        }
        Command::VerifyPayment { order_id } => {
            let verification = runtime.payments.verify(&order_id).await?;
            println!("{:?}", verification.outcome());
            println!("{}", serde_json::to_string_pretty(&verification)?);
        }
    }
    Ok(())
}
