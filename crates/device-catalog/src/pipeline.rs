use std::fmt;
use std::sync::Arc;

use rust_decimal::Decimal;

use crate::device::DeviceEntity;
use crate::feedback::Feedback;
use crate::gateway::{DeviceGateway, GatewayError};
use crate::persist::CapacityRewrite;
use crate::sync::{CatalogProvider, SyncError};
use crate::{builder, dedup, parse, persist};

/// Price assigned to every device created by a sync.
pub const DEFAULT_PRICE: Decimal = Decimal::from_parts(202_507, 0, 0, false, 2);

/// Immutable settings for a `SyncPipeline`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    pub fixed_price: Decimal,
    pub rewrite: CapacityRewrite,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            fixed_price: DEFAULT_PRICE,
            rewrite: CapacityRewrite::default(),
        }
    }
}

/// Stages of a sync run, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStage {
    Fetching,
    Parsing,
    Normalizing,
    Building,
    Deduplicating,
    Persisting,
    Rewriting,
}

impl fmt::Display for SyncStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Fetching => "fetch",
            Self::Parsing => "parse",
            Self::Normalizing => "normalize",
            Self::Building => "build",
            Self::Deduplicating => "deduplicate",
            Self::Persisting => "persist",
            Self::Rewriting => "rewrite",
        };
        f.write_str(name)
    }
}

/// Summary of a completed sync run.
#[derive(Debug, Clone, Default)]
pub struct SyncReport {
    /// Devices created by this run, with their store ids.
    pub created: Vec<DeviceEntity>,
    /// Candidates skipped because their name already existed or repeated.
    pub dropped_duplicates: usize,
    /// Candidates the store rejected.
    pub failed: usize,
    pub feedback: Vec<Feedback>,
}

fn failed_at(stage: SyncStage) -> impl FnOnce(GatewayError) -> SyncError {
    move |e| SyncError::Sync(format!("{stage} stage failed: {e}"))
}

fn enter(stage: SyncStage) {
    tracing::debug!(%stage, "entering sync stage");
}

/// Fetches the catalog, reconciles it with the store, and applies the
/// capacity rewrite.
pub struct SyncPipeline {
    provider: Arc<dyn CatalogProvider>,
    gateway: Arc<dyn DeviceGateway>,
    config: PipelineConfig,
}

impl SyncPipeline {
    pub fn new(
        provider: Arc<dyn CatalogProvider>,
        gateway: Arc<dyn DeviceGateway>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            provider,
            gateway,
            config,
        }
    }

    pub fn provider_label(&self) -> &str {
        self.provider.label()
    }

    /// Run one sync.
    ///
    /// A non-200 response or an undecodable body aborts before anything is
    /// written. Rows the store rejects are reported as feedback and left out
    /// of `SyncReport::created`.
    pub async fn run(&self) -> Result<SyncReport, SyncError> {
        tracing::info!(provider = self.provider.label(), "starting device sync");

        enter(SyncStage::Fetching);
        let response = self
            .provider
            .fetch()
            .await
            .map_err(|e| SyncError::Sync(e.to_string()))?;
        if response.status != 200 {
            return Err(SyncError::Api {
                status: response.status,
            });
        }

        enter(SyncStage::Parsing);
        let records = parse::decode(&response.body)?;

        enter(SyncStage::Normalizing);
        let devices = parse::normalize_records(&records);
        if devices.is_empty() {
            tracing::info!(received = records.len(), "catalog has no named devices");
            return Ok(SyncReport::default());
        }

        enter(SyncStage::Building);
        let candidates = builder::build_entities(&devices, self.config.fixed_price);

        enter(SyncStage::Deduplicating);
        let deduped = dedup::deduplicate(self.gateway.as_ref(), candidates)
            .await
            .map_err(failed_at(SyncStage::Deduplicating))?;

        enter(SyncStage::Persisting);
        let created = persist::create_devices(self.gateway.as_ref(), &deduped.unique)
            .await
            .map_err(failed_at(SyncStage::Persisting))?;

        enter(SyncStage::Rewriting);
        let rewritten = persist::rewrite_capacity(self.gateway.as_ref(), &self.config.rewrite)
            .await
            .map_err(failed_at(SyncStage::Rewriting))?;

        let mut feedback = Vec::new();
        if deduped.dropped > 0 {
            feedback.push(Feedback::info(format!(
                "{} device(s) already present or repeated in the catalog",
                deduped.dropped
            )));
        }
        feedback.extend(created.feedback);
        feedback.extend(rewritten.feedback);

        tracing::info!(
            received = records.len(),
            created = created.devices.len(),
            duplicates = deduped.dropped,
            failed = created.failed,
            "device sync finished"
        );

        Ok(SyncReport {
            created: created.devices,
            dropped_duplicates: deduped.dropped,
            failed: created.failed,
            feedback,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{InMemoryGateway, SAMPLE_CATALOG, StaticProvider};

    fn pipeline(provider: StaticProvider, gateway: Arc<InMemoryGateway>) -> SyncPipeline {
        SyncPipeline::new(Arc::new(provider), gateway, PipelineConfig::default())
    }

    #[test]
    fn default_price_is_2025_07() {
        assert_eq!(DEFAULT_PRICE.to_string(), "2025.07");
    }

    #[tokio::test]
    async fn sample_catalog_creates_every_device() {
        let gateway = Arc::new(InMemoryGateway::new());
        let report = pipeline(StaticProvider::ok(SAMPLE_CATALOG), gateway.clone())
            .run()
            .await
            .unwrap();

        assert_eq!(report.created.len(), 7);
        assert_eq!(report.dropped_duplicates, 0);
        assert!(report.created.iter().all(|d| d.price == DEFAULT_PRICE));

        let pro_max = &report.created[2];
        assert_eq!(pro_max.name, "Apple iPhone 12 Pro Max");
        assert_eq!(pro_max.capacity.as_deref(), Some("512 GB"));

        let watch = &report.created[6];
        assert_eq!(watch.color.as_deref(), Some("Elderberry"));
    }

    #[tokio::test]
    async fn sample_catalog_sweep_rewrites_only_the_64_gb_device() {
        let gateway = Arc::new(InMemoryGateway::new());
        pipeline(StaticProvider::ok(SAMPLE_CATALOG), gateway.clone())
            .run()
            .await
            .unwrap();

        let rewritten: Vec<String> = gateway
            .devices()
            .into_iter()
            .filter(|d| d.capacity.as_deref() == Some("46GB"))
            .map(|d| d.name)
            .collect();
        assert_eq!(rewritten, vec!["Apple iPhone 11, 64GB"]);
        assert_eq!(gateway.update_calls(), 1);
    }

    #[tokio::test]
    async fn second_run_creates_nothing() {
        let gateway = Arc::new(InMemoryGateway::new());
        pipeline(StaticProvider::ok(SAMPLE_CATALOG), gateway.clone())
            .run()
            .await
            .unwrap();

        let report = pipeline(StaticProvider::ok(SAMPLE_CATALOG), gateway.clone())
            .run()
            .await
            .unwrap();

        assert!(report.created.is_empty());
        assert_eq!(report.dropped_duplicates, 7);
        assert_eq!(gateway.devices().len(), 7);
        // Nothing left to create, so the second run never calls create.
        assert_eq!(gateway.create_calls(), 1);
    }

    #[tokio::test]
    async fn in_batch_duplicate_keeps_first() {
        let gateway = Arc::new(InMemoryGateway::new());
        let body = r#"[
            {"name":"Pixel","data":{"color":"first"}},
            {"name":"Pixel","data":{"color":"second"}}
        ]"#;

        let report = pipeline(StaticProvider::ok(body), gateway.clone())
            .run()
            .await
            .unwrap();

        assert_eq!(report.created.len(), 1);
        assert_eq!(report.created[0].color.as_deref(), Some("first"));
        assert_eq!(report.dropped_duplicates, 1);
    }

    #[tokio::test]
    async fn server_error_aborts_before_store() {
        let gateway = Arc::new(InMemoryGateway::new());
        let result = pipeline(StaticProvider::with_status(500, "oops"), gateway.clone())
            .run()
            .await;

        assert!(matches!(result, Err(SyncError::Api { status: 500 })));
        assert_eq!(gateway.create_calls(), 0);
        assert_eq!(gateway.update_calls(), 0);
    }

    #[tokio::test]
    async fn no_content_status_is_api_error() {
        let gateway = Arc::new(InMemoryGateway::new());
        let result = pipeline(StaticProvider::with_status(204, "[]"), gateway.clone())
            .run()
            .await;

        assert!(matches!(result, Err(SyncError::Api { status: 204 })));
        assert_eq!(gateway.create_calls(), 0);
    }

    #[tokio::test]
    async fn malformed_body_is_parse_error_without_writes() {
        let gateway = Arc::new(InMemoryGateway::new());
        let result = pipeline(StaticProvider::ok("invalid json"), gateway.clone())
            .run()
            .await;

        assert!(matches!(result, Err(SyncError::Parse(_))));
        assert_eq!(gateway.create_calls(), 0);
        assert_eq!(gateway.update_calls(), 0);
    }

    #[tokio::test]
    async fn transport_failure_is_sync_error() {
        let gateway = Arc::new(InMemoryGateway::new());
        let result = pipeline(StaticProvider::unreachable("timed out"), gateway)
            .run()
            .await;

        match result {
            Err(SyncError::Sync(detail)) => assert!(detail.contains("timed out")),
            other => panic!("expected sync error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn empty_catalog_skips_rewrite() {
        let gateway = Arc::new(InMemoryGateway::new());
        gateway.seed(DeviceEntity {
            id: None,
            name: "Legacy".into(),
            color: None,
            capacity: Some("64 GB".into()),
            price: DEFAULT_PRICE,
        });

        let report = pipeline(StaticProvider::ok(r#"[{"name":" "}]"#), gateway.clone())
            .run()
            .await
            .unwrap();

        assert!(report.created.is_empty());
        assert_eq!(gateway.update_calls(), 0);
        assert_eq!(gateway.devices()[0].capacity.as_deref(), Some("64 GB"));
    }

    #[tokio::test]
    async fn sweep_covers_devices_from_earlier_runs() {
        let gateway = Arc::new(InMemoryGateway::new());
        gateway.seed(DeviceEntity {
            id: None,
            name: "Legacy".into(),
            color: None,
            capacity: Some("64 GB".into()),
            price: DEFAULT_PRICE,
        });

        pipeline(StaticProvider::ok(r#"[{"name":"New"}]"#), gateway.clone())
            .run()
            .await
            .unwrap();

        assert_eq!(gateway.devices()[0].capacity.as_deref(), Some("46GB"));
    }

    #[tokio::test]
    async fn rejected_rows_become_feedback() {
        let gateway = Arc::new(InMemoryGateway::new());
        gateway.fail_on("Apple AirPods");

        let report = pipeline(StaticProvider::ok(SAMPLE_CATALOG), gateway)
            .run()
            .await
            .unwrap();

        assert_eq!(report.created.len(), 6);
        assert_eq!(report.failed, 1);
        assert!(report.feedback.iter().any(|f| f.is_warning()));
        assert!(report.created.iter().all(|d| d.name != "Apple AirPods"));
    }

    #[tokio::test]
    async fn custom_config_is_applied() {
        let gateway = Arc::new(InMemoryGateway::new());
        let config = PipelineConfig {
            fixed_price: Decimal::new(999, 2),
            rewrite: CapacityRewrite {
                from: "128 GB".into(),
                to: "128GB".into(),
            },
        };
        let pipeline = SyncPipeline::new(
            Arc::new(StaticProvider::ok(SAMPLE_CATALOG)),
            gateway.clone(),
            config,
        );

        let report = pipeline.run().await.unwrap();
        assert_eq!(report.created[0].price, Decimal::new(999, 2));
        assert_eq!(gateway.devices()[0].capacity.as_deref(), Some("128GB"));
        assert_eq!(gateway.devices()[3].capacity.as_deref(), Some("64 GB"));
    }
}
