// Dataspace connector gateway - protocol entry point
// Serves version discovery, the catalog endpoints and the negotiation and
// transfer state machines over HTTP.

use anyhow::Context;
use catalog::CatalogStore;
use connector_gateway::api::{app, AppState};
use connector_gateway::settings::GatewaySettings;
use negotiation::NegotiationEngine;
use process_store::{MemoryStore, ProcessStore, RocksStore, StoreConfig};
use protocol_messages::catalog::{DataService, Dataset};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use transfer::TransferEngine;
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let settings = GatewaySettings::load().context("failed to load gateway settings")?;
    info!(?settings, "starting connector gateway");

    let store: Arc<dyn ProcessStore> = match &settings.store_dir {
        Some(dir) => {
            let config = StoreConfig {
                data_dir: dir.clone(),
                ..StoreConfig::default()
            };
            Arc::new(RocksStore::open(&config).context("failed to open process store")?)
        }
        None => {
            warn!("no store directory configured, process records are not durable");
            Arc::new(MemoryStore::new())
        }
    };

    let catalog = Arc::new(CatalogStore::new(
        settings.participant_id.clone(),
        DataService {
            id: format!("urn:uuid:{}", Uuid::new_v4()),
            endpoint_url: settings.endpoint_url.clone(),
        },
    ));
    if let Some(path) = &settings.catalog_file {
        let published = publish_datasets(&catalog, path)
            .with_context(|| format!("failed to publish catalog from {:?}", path))?;
        info!(datasets = published, "catalog published");
    }

    let state = AppState {
        catalog: catalog.clone(),
        negotiation: Arc::new(NegotiationEngine::new(store.clone(), catalog)),
        transfer: Arc::new(TransferEngine::new(store.clone())),
        store,
    };

    let listener = tokio::net::TcpListener::bind(&settings.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", settings.listen_addr))?;
    info!("listening on {}", settings.listen_addr);

    axum::serve(listener, app(state)).await?;
    Ok(())
}

// Seed the catalog from a JSON file holding an array of datasets
fn publish_datasets(catalog: &CatalogStore, path: &std::path::Path) -> anyhow::Result<usize> {
    let content = std::fs::read_to_string(path)?;
    let datasets: Vec<Dataset> = serde_json::from_str(&content)?;
    let count = datasets.len();
    for dataset in datasets {
        catalog.upsert_dataset(dataset)?;
    }
    Ok(count)
}
