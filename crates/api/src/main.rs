use std::sync::Arc;

use calenduck_api::app::config::ApiConfig;
use calenduck_api::app::services::AppServices;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    calenduck_observability::init();

    let config = ApiConfig::from_env();

    let services = if config.use_persistent_stores {
        Arc::new(AppServices::connect(&config).await?)
    } else {
        tracing::warn!("USE_PERSISTENT_STORES not enabled; using in-memory stores");
        Arc::new(AppServices::in_memory(&config.jwt_secret, config.page_size))
    };

    let app = calenduck_api::app::build_app(services);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
