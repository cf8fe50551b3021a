use anyhow::Context;
use guarantee_commission::datasource::HttpRateLookup;
use guarantee_commission::db::import_tiers_csv;
use guarantee_commission::{api, config::Config, db::init_db, MinimalRateLookup, Repository};
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing_subscriber::filter::LevelFilter::INFO.into()),
        )
        .init();

    let config = Config::from_env().context("Configuration error")?;

    let pool = init_db(&config.database_path)
        .await
        .context("Failed to initialize database")?;
    let repo = Arc::new(Repository::new(pool));

    if let Some(csv_path) = &config.rate_tiers_csv {
        import_tiers_csv(&repo, Path::new(csv_path))
            .await
            .with_context(|| format!("Failed to import rate tiers from {}", csv_path))?;
    }

    let lookup: Arc<dyn MinimalRateLookup> = Arc::new(
        HttpRateLookup::new(
            config.rate_lookup_url.clone(),
            config.rate_lookup_timeout,
            config.rate_lookup_max_elapsed,
        )
        .context("Failed to build minimal rate client")?,
    );
    if let Some(year) = config.year_basis_override {
        tracing::warn!("Annualizing with the day count of {} instead of the current year", year);
    }

    let app = api::create_router(api::AppState::new(
        repo,
        lookup,
        config.year_basis_override,
    ));

    let addr = SocketAddr::from(([127, 0, 0, 1], config.port));
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
