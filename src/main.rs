use std::sync::Arc;

use placeshare::config::Config;
use placeshare::db::PgStore;
use placeshare::engine::Engine;
use placeshare::external::{Geocoder, GoogleMaps};
use placeshare::images::ImageStore;
use placeshare::server::serve;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = Config::from_env()?;

    let store = PgStore::connect(&config.database.url(), config.database.max_connections).await?;

    let geocoder = config.geocoding.as_ref().map(|geocoding| {
        Arc::new(GoogleMaps::new(
            geocoding.api_base.clone(),
            geocoding.api_key.clone(),
        )) as Arc<dyn Geocoder>
    });

    let engine = Arc::new(Engine::new(Arc::new(store), geocoder));

    let images = ImageStore::new(&config.upload_dir);
    images.prepare().await?;

    serve(engine.clone(), images, config.port, shutdown_signal()).await?;

    engine.shutdown().await;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
    }

    tracing::info!("shutting down");
}
