use super::api_client::{ApiRequest, RequestPipeline, Upstream};
use super::endpoints::monitoring;
use super::error::ApiError;
use crate::models::{
    Alert, AlertRule, GrafanaUrl, LogPage, LogQuery, PrometheusResult, SystemMetrics, TimeRange,
};
use serde_json::json;

/// Metrics, logs and alerts as aggregated by the gateway.
#[derive(Clone)]
pub struct MonitoringClient {
    pipeline: RequestPipeline,
}

impl MonitoringClient {
    pub fn new(pipeline: RequestPipeline) -> Self {
        Self { pipeline }
    }

    pub async fn system_metrics(&self, range: TimeRange) -> Result<SystemMetrics, ApiError> {
        let request = ApiRequest::get(monitoring::SYSTEM_METRICS).query("range", range);
        self.pipeline.call(Upstream::Gateway, request).await
    }

    pub async fn service_metrics(
        &self,
        service: &str,
        range: TimeRange,
    ) -> Result<SystemMetrics, ApiError> {
        let request =
            ApiRequest::get(monitoring::service_metrics(service)).query("range", range);
        self.pipeline.call(Upstream::Gateway, request).await
    }

    pub async fn logs(&self, query: &LogQuery) -> Result<LogPage, ApiError> {
        let request = ApiRequest::get(monitoring::LOGS).query_from(query)?;
        self.pipeline.call(Upstream::Gateway, request).await
    }

    pub async fn alert_rules(&self) -> Result<Vec<AlertRule>, ApiError> {
        self.pipeline
            .call(Upstream::Gateway, ApiRequest::get(monitoring::ALERT_RULES))
            .await
    }

    pub async fn active_alerts(&self) -> Result<Vec<Alert>, ApiError> {
        self.pipeline
            .call(Upstream::Gateway, ApiRequest::get(monitoring::ACTIVE_ALERTS))
            .await
    }

    pub async fn vm_metrics(&self, vm_id: &str, range: TimeRange) -> Result<SystemMetrics, ApiError> {
        let request = ApiRequest::get(monitoring::vm_metrics(vm_id)).query("range", range);
        self.pipeline.call(Upstream::Gateway, request).await
    }

    /// Link to a Grafana dashboard; the gateway picks its default when
    /// `dashboard` is unset.
    pub async fn grafana_url(&self, dashboard: Option<&str>) -> Result<GrafanaUrl, ApiError> {
        let mut request = ApiRequest::get(monitoring::GRAFANA_URL);
        if let Some(name) = dashboard {
            request = request.query("dashboard", name);
        }
        self.pipeline.call(Upstream::Gateway, request).await
    }

    pub async fn prometheus_query(&self, query: &str) -> Result<PrometheusResult, ApiError> {
        let request =
            ApiRequest::post(monitoring::PROMETHEUS_QUERY).json(&json!({ "query": query }))?;
        self.pipeline.call(Upstream::Gateway, request).await
    }
}
