use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ServiceStatus {
    Healthy,
    Unhealthy,
    #[default]
    #[serde(other)]
    Unknown,
}

impl fmt::Display for ServiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ServiceStatus::Healthy => "healthy",
            ServiceStatus::Unhealthy => "unhealthy",
            ServiceStatus::Unknown => "unknown",
        };
        f.pad(s)
    }
}

/// A microservice registered with the gateway.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ServiceInfo {
    pub name: String,
    pub url: String,
    pub health_check: String,
    /// Seconds.
    pub timeout: u64,
    /// Requests per minute.
    pub rate_limit: u64,
    #[serde(default)]
    pub status: ServiceStatus,
    #[serde(default)]
    pub last_check: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct HealthReport {
    pub status: String,
    #[serde(default, alias = "services", skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}
