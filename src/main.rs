use moodarc_stats::{build_router, config::Config, AppState, Clock};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "moodarc_stats=debug,tower_http=debug".into()),
        )
        .json()
        .init();

    let config = Config::from_env();
    let addr = config.listen_addr();

    tracing::info!(
        stats_api = %config.stats_api_base_url,
        timeout_secs = config.stats_api_timeout_secs,
        "Statistics API configured"
    );

    let state = AppState::new(config, Clock::System)?;
    let app = build_router(state);

    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
