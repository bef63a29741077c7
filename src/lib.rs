pub mod api;
pub mod cli;
pub mod clients;
pub mod config;
pub mod db;
pub mod domain;
pub mod entities;
pub mod models;
pub mod services;
pub mod state;

use anyhow::Context;
use clap::Parser;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
pub use config::Config;
use domain::Role;
use services::Registration;

pub async fn run() -> anyhow::Result<()> {
    // RUST_LOG and friends may come from .env
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let config = Config::load()?;
    config.validate()?;

    init_tracing(&config);

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => run_server(config).await,

        Commands::Init => cli::cmd_init(),

        Commands::List {
            subtype,
            status,
            sort,
            title,
        } => cli::cmd_list_anime(config, title, subtype, status, sort.as_deref()).await,

        Commands::Search { query } => cli::cmd_search_remote(&config, &query.join(" ")).await,

        Commands::Import { title } => cli::cmd_import(config, &title.join(" ")).await,

        Commands::CreateAdmin {
            username,
            email,
            password,
            firstname,
            lastname,
        } => {
            let registration = Registration {
                firstname,
                lastname,
                username,
                email,
                confirm_password: password.clone(),
                password,
            };
            cli::cmd_create_admin(&config, registration).await
        }
    }
}

fn init_tracing(config: &Config) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.general.log_level));

    let registry = tracing_subscriber::registry().with(env_filter);

    if config.observability.json_logs {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

fn init_metrics(config: &Config) -> anyhow::Result<Option<metrics_exporter_prometheus::PrometheusHandle>> {
    if !config.observability.metrics_enabled {
        return Ok(None);
    }

    use metrics_exporter_prometheus::PrometheusBuilder;
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .context("Failed to install Prometheus recorder")?;
    info!("Prometheus metrics recorder initialized");
    Ok(Some(handle))
}

async fn run_server(config: Config) -> anyhow::Result<()> {
    info!("Kitsudex v{} starting...", env!("CARGO_PKG_VERSION"));

    let prometheus_handle = init_metrics(&config)?;
    let addr = format!("{}:{}", config.server.bind_address, config.server.port);

    let api_state = api::create_app_state_from_config(config, prometheus_handle).await?;
    if !api_state
        .store()
        .list_users()
        .await?
        .iter()
        .any(|u| u.role == Role::Admin)
    {
        warn!("No administrator exists yet. Create one with `kitsudex create-admin`");
    }
    let app = api::router(api_state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    info!("🌐 Web Server running at http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Web server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    match signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => error!("Error listening for shutdown: {}", e),
    }
}
