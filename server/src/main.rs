use anyhow::Result;
use std::{net::SocketAddr, sync::Arc};
use tracing::{Level, info};

use server::http;
use server::store::{
    Backoff, CollectionPair, KeyValueBackend, ObjectStoreBackend, StorageConfig, StoreConfig,
    VersionedStore, retry,
};
use server::validate::{AcceptAll, CommandValidator, Validator};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(Level::INFO.into()),
        )
        .init();

    info!("Starting config archive server");

    // Initialize the storage backend
    let storage_config = StorageConfig::from_env()?;
    #[allow(irrefutable_let_patterns)]
    if let StorageConfig::Local { path } = &storage_config {
        info!("Using storage path: {}", path.display());
        std::fs::create_dir_all(path)?;
    }
    let backend: Arc<dyn KeyValueBackend> = Arc::new(ObjectStoreBackend::from_config(
        storage_config,
    )?);

    // Make sure the backend answers before accepting traffic.
    let collections = CollectionPair::from_env();
    wait_for_backend(Arc::clone(&backend), &collections.current).await?;

    let validator = validator_from_env()?;
    let store = Arc::new(VersionedStore::new(
        backend,
        validator,
        StoreConfig::from_env(),
        collections,
    ));

    // Bind to address
    let addr = std::env::var("BIND_ADDRESS")
        .unwrap_or_else(|_| "0.0.0.0:3000".to_string())
        .parse::<SocketAddr>()?;

    // Start the HTTP server
    http::start_server(store, addr).await?;

    Ok(())
}

async fn wait_for_backend(backend: Arc<dyn KeyValueBackend>, collection: &str) -> Result<()> {
    info!("Waiting for the storage backend to become available...");
    retry(Backoff::endpoint(), || {
        let backend = Arc::clone(&backend);
        let collection = collection.to_string();
        async move {
            match backend.fetch(&collection).await {
                Ok(_) => Ok(true),
                Err(e) => Err(anyhow::Error::new(e)),
            }
        }
    })
    .await
}

/// Build the validator from VALIDATOR_CMD, e.g.
/// `VALIDATOR_CMD="promtool check rules"`. The staged content file is
/// appended as the final argument. Unset means accept everything.
fn validator_from_env() -> Result<Arc<dyn Validator>> {
    match std::env::var("VALIDATOR_CMD") {
        Ok(cmd) if !cmd.trim().is_empty() => {
            let mut parts = cmd.split_whitespace().map(str::to_string);
            let Some(program) = parts.next() else {
                anyhow::bail!("VALIDATOR_CMD is set but empty");
            };
            info!("Validating updates with: {cmd}");
            Ok(Arc::new(CommandValidator::new(program, parts.collect())))
        }
        _ => {
            info!("No validator configured, accepting all content");
            Ok(Arc::new(AcceptAll))
        }
    }
}
