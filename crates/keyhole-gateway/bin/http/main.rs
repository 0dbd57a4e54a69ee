mod cli;

use crate::cli::{LogFormatArg, StorageBackendArg, CLI};
use clap::Parser;
use keyhole_gateway::{App, AppState};
use keyhole_generator::{GeneratorSettings, HashKeyGenerator};
use keyhole_shortener::{Shortener, ShortenerService};
use keyhole_storage::{InMemoryKeyStore, MySqlKeyStore};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = CLI::parse();

    init_tracing(config.log_format);

    info!(
        listen_addr = %config.listen_addr,
        base_url = %config.base_url,
        storage_backend = %config.storage,
        key_length = config.key_length,
        max_retries = config.max_retries,
        "starting gateway server"
    );

    let generator = HashKeyGenerator::new(
        GeneratorSettings::builder()
            .key_length(config.key_length)
            .max_retries(config.max_retries)
            .build(),
    )?;

    let shortener: Arc<dyn Shortener> = match config.storage {
        StorageBackendArg::InMemory => Arc::new(ShortenerService::new(
            InMemoryKeyStore::new(),
            generator,
            config.base_url,
        )),
        StorageBackendArg::Mysql => {
            let mysql_dsn = config
                .mysql_dsn
                .as_deref()
                .ok_or("mysql dsn is required when storage backend is mysql")?;
            let store = MySqlKeyStore::connect(mysql_dsn).await?;
            store.ensure_schema().await?;
            Arc::new(ShortenerService::new(store, generator, config.base_url))
        }
    };

    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    info!(listen_addr = %listener.local_addr()?, "listening");

    axum::serve(listener, App::router(AppState::new(shortener)))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("gateway server stopped");
    Ok(())
}

fn init_tracing(format: LogFormatArg) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match format {
        LogFormatArg::Text => builder.init(),
        LogFormatArg::Json => builder.json().init(),
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
