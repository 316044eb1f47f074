pub mod api;
pub mod clients;
pub mod config;
pub mod db;
pub mod entities;
pub mod models;
pub mod services;

use clients::geocoding::GeocodingClient;
pub use config::Config;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

pub async fn run() -> anyhow::Result<()> {
    let config = Config::load()?;

    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.general.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args: Vec<String> = std::env::args().collect();

    match args.get(1).map(String::as_str) {
        None | Some("serve") => run_server(config).await,

        Some("init") => {
            if Config::create_default_if_missing()? {
                println!("Wrote default config.toml. Set your Google API key before serving.");
            } else {
                println!("config.toml already exists, leaving it alone.");
            }
            Ok(())
        }

        Some("test-api") => cmd_test_api(&config).await,

        Some("help" | "-h" | "--help") => {
            print_help();
            Ok(())
        }

        Some(other) => {
            println!("Unknown command: {other}\n");
            print_help();
            Ok(())
        }
    }
}

async fn run_server(config: Config) -> anyhow::Result<()> {
    config.validate()?;

    info!("Prospectr v{} starting...", env!("CARGO_PKG_VERSION"));

    if !config.server.enabled {
        info!("Server is disabled in config.toml, nothing to do");
        return Ok(());
    }

    let port = config.server.port;
    let state = api::create_app_state(config).await?;
    let app = api::router(state);

    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("API listening at http://{}", addr);

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

async fn cmd_test_api(config: &Config) -> anyhow::Result<()> {
    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(
            config.google.request_timeout_seconds,
        ))
        .user_agent("Prospectr/1.0")
        .build()?;

    let geocoding = GeocodingClient::new(
        client,
        config.google.geocode_url.clone(),
        config.google.api_key.clone(),
    );

    println!("Testing Google API connectivity...");
    let result = geocoding.test_connection().await;

    println!("  HTTP status: {}", result.status);
    println!("  API status:  {}", result.api_status);
    println!("  Message:     {}", result.message);
    println!(
        "\n{}",
        if result.success {
            "API key works."
        } else {
            "API test failed. Check your key in config.toml or PROSPECTR_GOOGLE_API_KEY."
        }
    );

    Ok(())
}

fn print_help() {
    println!("Prospectr v{}", env!("CARGO_PKG_VERSION"));
    println!("Business lead prospecting backend\n");
    println!("Usage: prospectr [command]\n");
    println!("Commands:");
    println!("  serve       Start the API server (default)");
    println!("  init        Write a default config.toml if none exists");
    println!("  test-api    Check Google API connectivity");
    println!("  help        Show this help");
}
