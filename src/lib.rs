pub mod api;
pub mod cli;
pub mod clients;
pub mod config;
pub mod constants;
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

use cli::{Cli, Commands, UserCommands};
pub use config::Config;
use constants::auth::DEFAULT_API_KEY;
use metrics_exporter_prometheus::PrometheusHandle;

pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = Config::load()?;
    config.validate()?;

    let prometheus_handle = if config.observability.metrics_enabled {
        use metrics_exporter_prometheus::PrometheusBuilder;
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .context("Failed to install Prometheus recorder")?;
        api::describe_metrics();
        Some(handle)
    } else {
        None
    };

    init_tracing(&config)?;

    match cli.command {
        Some(Commands::Serve) => run_server(config, prometheus_handle).await,

        Some(Commands::Init) => {
            if Config::create_default_if_missing()? {
                println!("✓ Config file created. Edit config.toml and run again.");
            } else {
                println!("config.toml already exists.");
            }
            Ok(())
        }

        Some(Commands::Scenes {
            latitude,
            longitude,
            days,
            max_cloud,
        }) => cli::cmd_scenes(&config, latitude, longitude, days, max_cloud).await,

        Some(Commands::Fetch {
            latitude,
            longitude,
            scene_id,
            user,
        }) => cli::cmd_fetch(&config, latitude, longitude, &scene_id, &user).await,

        Some(Commands::History { user, limit }) => cli::cmd_history(&config, &user, limit).await,

        Some(Commands::Pixels { search_id, user }) => {
            cli::cmd_pixels(&config, search_id, &user).await
        }

        Some(Commands::User { command }) => match command {
            UserCommands::Add { username, email } => {
                cli::cmd_user_add(&config, &username, &email).await
            }
            UserCommands::ApiKey {
                username,
                regenerate,
            } => cli::cmd_user_api_key(&config, &username, regenerate).await,
        },

        None => {
            use clap::CommandFactory;
            Cli::command().print_help()?;
            Ok(())
        }
    }
}

fn init_tracing(config: &Config) -> anyhow::Result<()> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.general.log_level));

    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer());

    if config.observability.loki_enabled {
        let url = url::Url::parse(&config.observability.loki_url).context("Invalid Loki URL")?;

        let (layer, task) = tracing_loki::builder()
            .label("app", "landsat-explorer")?
            .extra_field("pid", std::process::id().to_string())?
            .build_url(url)?;

        tokio::spawn(task);

        registry.with(layer).init();
        info!(
            "Loki logging initialized at {}",
            config.observability.loki_url
        );
    } else {
        registry.init();
    }

    Ok(())
}

async fn run_server(
    config: Config,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<()> {
    info!(
        "Landsat Explorer v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    if !config.server.enabled {
        warn!("Server is disabled in config ([server] enabled = false)");
        return Ok(());
    }

    if config.imagery.username.is_empty() {
        warn!("No imagery credentials configured; set LANDSAT_USERNAME and LANDSAT_PASSWORD");
    }

    let port = config.server.port;
    let api_state = api::create_app_state_from_config(config, prometheus_handle).await?;

    if api_state
        .store()
        .verify_api_key(DEFAULT_API_KEY)
        .await?
        .is_some()
    {
        warn!("The default API key is still active; regenerate it with `landsat-explorer user api-key explorer --regenerate`");
    }

    let app = api::router(api_state).await;
    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    info!("🌐 Web Server running at http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    match signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => error!("Error listening for shutdown: {}", e),
    }
}
