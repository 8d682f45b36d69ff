use gsm_auth::{ApiKeyGuard, OperatorRateLimiter};
use gsm_config::Config;
use gsm_core::{GameLogDirectory, HostServices, LifecycleOrchestrator, ResourceSampler};

use std::sync::Arc;

use metrics_exporter_prometheus::PrometheusHandle;
use tokio_util::sync::CancellationToken;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<LifecycleOrchestrator>,
    pub api_key: ApiKeyGuard,
    pub rate_limiter: Arc<OperatorRateLimiter>,
    pub sampler: ResourceSampler,
    pub game_logs: GameLogDirectory,
    pub prometheus: Option<PrometheusHandle>,
}

impl AppState {
    /// `cancel` is the controller's root token, cancelled on shutdown.
    pub fn new(config: &Config, host: HostServices, cancel: CancellationToken) -> Self {
        Self {
            orchestrator: Arc::new(LifecycleOrchestrator::new(config, host, cancel)),
            api_key: ApiKeyGuard::from_config(&config.auth),
            rate_limiter: Arc::new(OperatorRateLimiter::from_config(&config.auth)),
            sampler: ResourceSampler::default(),
            game_logs: GameLogDirectory::new(config.game.log_dir()),
            prometheus: None,
        }
    }

    pub fn with_prometheus(mut self, handle: PrometheusHandle) -> Self {
        self.prometheus = Some(handle);
        self
    }
}
