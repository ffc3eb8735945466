use super::api_client::{ApiRequest, RequestPipeline, Upstream};
use super::endpoints::gateway;
use super::error::ApiError;
use crate::models::{HealthReport, ServiceInfo};

/// Read-only view of the gateway's service registry.
#[derive(Clone)]
pub struct GatewayClient {
    pipeline: RequestPipeline,
}

impl GatewayClient {
    pub fn new(pipeline: RequestPipeline) -> Self {
        Self { pipeline }
    }

    pub async fn services(&self) -> Result<Vec<ServiceInfo>, ApiError> {
        self.pipeline
            .call(Upstream::Gateway, ApiRequest::get(gateway::SERVICES))
            .await
    }

    pub async fn service_health(&self, name: &str) -> Result<HealthReport, ApiError> {
        self.pipeline
            .call(
                Upstream::Gateway,
                ApiRequest::get(gateway::service_health(name)),
            )
            .await
    }

    pub async fn gateway_health(&self) -> Result<HealthReport, ApiError> {
        self.pipeline
            .call(Upstream::Gateway, ApiRequest::get(gateway::HEALTH))
            .await
    }

    /// Raw Prometheus exposition text.
    pub async fn metrics(&self) -> Result<String, ApiError> {
        self.pipeline
            .call_text(Upstream::Gateway, ApiRequest::get(gateway::METRICS))
            .await
    }
}
