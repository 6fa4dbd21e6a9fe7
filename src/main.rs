use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rerun_bot::config::{ActionInputs, ConfigError, ServerConfig};
use rerun_bot::github::OctocrabClient;
use rerun_bot::server::{AppState, build_router, job_channel, run_dispatcher};

#[derive(Debug, Parser)]
#[command(
    name = "rerun-bot",
    version,
    about = "Re-run pull request workflows from comment commands"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the webhook server.
    Serve {
        /// Path to the YAML config file.
        #[arg(short, long, env = "RERUN_BOT_CONFIG", default_value = "config.yml")]
        config: PathBuf,

        /// Overrides `github.token` from the config file.
        #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
        github_token: Option<String>,
    },

    /// Handle one comment as a GitHub Action step.
    Action,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rerun_bot=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match Cli::parse().command {
        Command::Serve {
            config,
            github_token,
        } => serve(config, github_token).await,
        Command::Action => action().await,
    }
}

async fn serve(config_path: PathBuf, github_token: Option<String>) -> anyhow::Result<()> {
    let config = ServerConfig::load(&config_path)?;
    let token = github_token
        .or_else(|| config.github.token.clone())
        .ok_or(ConfigError::MissingToken)?;
    if config.github.webhook_secret.is_empty() {
        return Err(ConfigError::MissingInput("github.webhook_secret").into());
    }

    let pipeline = Arc::new(config.app_configuration.build_pipeline()?);
    let octocrab = OctocrabClient::build_octocrab(token, config.github.v3_api_url.as_deref())
        .context("failed to build GitHub client")?;

    let shutdown = CancellationToken::new();
    let (jobs, rx) = job_channel();
    let dispatcher = tokio::spawn(run_dispatcher(rx, pipeline, octocrab, shutdown.clone()));

    let app = build_router(AppState::new(config.github.webhook_secret.as_bytes(), jobs));
    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!("listening on {}", addr);

    let signal = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Received Ctrl-C, shutting down");
        }
        signal.cancel();
    });

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await
        .context("server error")?;
    dispatcher.await.context("dispatcher panicked")?;
    Ok(())
}

async fn action() -> anyhow::Result<()> {
    let inputs = ActionInputs::from_env()?;
    tracing::debug!(
        repo = %inputs.repository,
        comment_id = ?inputs.comment_id,
        workflow = ?inputs.workflow,
        "Starting rerun action"
    );
    let outcome = rerun_bot::action::run(&inputs).await?;
    tracing::info!(?outcome, "Done");
    Ok(())
}
