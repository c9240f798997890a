// Gateway configuration
// Defaults overridable via CONNECTOR_* environment variables (and .env)

use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Clone, Deserialize)]
pub struct GatewaySettings {
    /// HTTP listen address
    pub listen_addr: String,

    /// Participant identifier advertised in the catalog
    pub participant_id: String,

    /// Public endpoint URL of this connector
    pub endpoint_url: String,

    /// Process store directory; in-memory store when unset
    pub store_dir: Option<PathBuf>,

    /// JSON file with the datasets to publish at startup
    pub catalog_file: Option<PathBuf>,
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8080".to_string(),
            participant_id: "urn:connector:provider".to_string(),
            endpoint_url: "http://localhost:8080".to_string(),
            store_dir: None,
            catalog_file: None,
        }
    }
}

impl GatewaySettings {
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let settings = config::Config::builder()
            .set_default("listen_addr", "0.0.0.0:8080")?
            .set_default("participant_id", "urn:connector:provider")?
            .set_default("endpoint_url", "http://localhost:8080")?
            .add_source(config::Environment::with_prefix("CONNECTOR"))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}
