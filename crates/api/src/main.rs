use anyhow::Context;

use homies_infra::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine; real deployments use the environment.
    let _ = dotenvy::dotenv();
    homies_observability::init();

    let config = AppConfig::from_env().context("invalid configuration")?;
    let app = homies_api::app::build_app(&config)
        .await
        .context("failed to initialise store")?;

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
