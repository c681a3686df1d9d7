//! dai-api - HTTP API server for the digital asset archive

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dai_api::{router, services::StreamWrapperUrlResolver, ApiConfig, AppState};
use dai_db::Database;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing with configurable output
    //
    // Environment variables:
    //   LOG_FORMAT  - "json" or "text" (default: "text")
    //   LOG_FILE    - path to log file (optional, enables file logging)
    //   LOG_ANSI    - "true"/"false" override ANSI colors (auto-detected by default)
    //   RUST_LOG    - standard env filter (default: "dai_api=debug,dai_core=info,tower_http=debug")
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let log_file = std::env::var("LOG_FILE").ok();
    let log_ansi = std::env::var("LOG_ANSI")
        .ok()
        .map(|v| v == "true" || v == "1");

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "dai_api=debug,dai_core=info,dai_db=info,tower_http=debug".into());

    let registry = tracing_subscriber::registry().with(env_filter);

    // Optionally create a file appender with daily rotation
    let _file_guard = if let Some(ref path) = log_file {
        let file_dir = std::path::Path::new(path)
            .parent()
            .unwrap_or(std::path::Path::new("."));
        let file_name = std::path::Path::new(path)
            .file_name()
            .and_then(|f| f.to_str())
            .unwrap_or("dai-api.log");
        let file_appender = tracing_appender::rolling::daily(file_dir, file_name);
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        if log_format == "json" {
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(non_blocking),
                )
                .init();
        } else {
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(log_ansi.unwrap_or(false));
            registry.with(layer).init();
        }
        Some(guard)
    } else {
        if log_format == "json" {
            registry
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        } else {
            let mut layer = tracing_subscriber::fmt::layer();
            if let Some(ansi) = log_ansi {
                layer = layer.with_ansi(ansi);
            }
            registry.with(layer).init();
        }
        None
    };

    info!(
        log_format = %log_format,
        log_file = log_file.as_deref().unwrap_or("(stdout)"),
        "Logging initialized"
    );

    let config = ApiConfig::from_env()?;

    info!(
        rate_limit_enabled = config.rate_limit_enabled,
        rate_limit_requests = config.rate_limit_requests,
        rate_limit_period_secs = config.rate_limit_period_secs,
        db_max_connections = config.pool.max_connections,
        site_base_url = %config.site_base_url,
        "Configuration loaded"
    );

    info!("Connecting to database...");
    let db = Database::connect_with_config(&config.database_url, config.pool.clone()).await?;
    info!("Database connected");

    let _pool_monitor = (config.pool_monitor_secs > 0).then(|| {
        dai_db::spawn_pool_monitor(
            db.pool.clone(),
            Duration::from_secs(config.pool_monitor_secs),
        )
    });

    info!("Running database migrations...");
    db.migrate().await?;
    info!("Database migrations complete");

    let file_urls = Arc::new(StreamWrapperUrlResolver::new(
        &config.site_base_url,
        &config.public_files_path,
        &config.private_files_path,
    ));
    let service = db
        .archive_service(file_urls)
        .with_notes_page_limit(config.notes_page_limit);

    let mut state = AppState::new(service, db.api_keys.clone());
    if config.rate_limit_enabled {
        state = state.with_rate_limit(
            config.rate_limit_requests,
            Duration::from_secs(config.rate_limit_period_secs),
        );
    }

    let app = router(state, &config.allowed_origins);

    // Start server
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
