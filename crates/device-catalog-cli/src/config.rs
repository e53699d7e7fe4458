use std::path::PathBuf;
use std::time::Duration;

use device_catalog::{CapacityRewrite, DEFAULT_PRICE, PipelineConfig};
use device_catalog_http::{DEFAULT_ENDPOINT, DEFAULT_TIMEOUT, RestCatalogConfig};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Top-level application configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "default_price")]
    pub fixed_price: Decimal,
    #[serde(default)]
    pub rewrite: RewriteConfig,
    /// SQLite file; defaults to the platform data directory.
    pub database: Option<PathBuf>,
}

/// The capacity substitution applied after every sync.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RewriteConfig {
    pub from: String,
    pub to: String,
}

impl Default for RewriteConfig {
    fn default() -> Self {
        let rewrite = CapacityRewrite::default();
        Self {
            from: rewrite.from,
            to: rewrite.to,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            timeout_ms: default_timeout_ms(),
            fixed_price: default_price(),
            rewrite: RewriteConfig::default(),
            database: None,
        }
    }
}

impl AppConfig {
    pub fn client_config(&self) -> RestCatalogConfig {
        RestCatalogConfig {
            endpoint: self.endpoint.clone(),
            timeout: Duration::from_millis(self.timeout_ms),
        }
    }

    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            fixed_price: self.fixed_price,
            rewrite: CapacityRewrite {
                from: self.rewrite.from.clone(),
                to: self.rewrite.to.clone(),
            },
        }
    }
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.into()
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT.as_millis() as u64
}

fn default_price() -> Decimal {
    DEFAULT_PRICE
}

/// Config file path: `~/.config/device-sync/config.toml`
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("device-sync").join("config.toml"))
}

/// Load config from file, falling back to defaults if missing.
pub fn load_config() -> AppConfig {
    if let Some(path) = config_path()
        && let Ok(contents) = std::fs::read_to_string(&path)
    {
        match toml::from_str::<AppConfig>(&contents) {
            Ok(config) => return config,
            Err(e) => tracing::warn!(
                path = %path.display(),
                error = %e,
                "failed to parse config, using defaults"
            ),
        }
    }

    AppConfig::default()
}
