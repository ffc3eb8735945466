use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Look-back window accepted by the monitoring endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TimeRange {
    #[serde(rename = "15m")]
    FifteenMinutes,
    #[default]
    #[serde(rename = "1h")]
    OneHour,
    #[serde(rename = "6h")]
    SixHours,
    #[serde(rename = "24h")]
    OneDay,
    #[serde(rename = "7d")]
    SevenDays,
    #[serde(rename = "30d")]
    ThirtyDays,
}

impl TimeRange {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeRange::FifteenMinutes => "15m",
            TimeRange::OneHour => "1h",
            TimeRange::SixHours => "6h",
            TimeRange::OneDay => "24h",
            TimeRange::SevenDays => "7d",
            TimeRange::ThirtyDays => "30d",
        }
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeRange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "15m" => Ok(TimeRange::FifteenMinutes),
            "1h" => Ok(TimeRange::OneHour),
            "6h" => Ok(TimeRange::SixHours),
            "24h" => Ok(TimeRange::OneDay),
            "7d" => Ok(TimeRange::SevenDays),
            "30d" => Ok(TimeRange::ThirtyDays),
            other => Err(format!(
                "unknown time range '{}', expected one of 15m, 1h, 6h, 24h, 7d, 30d",
                other
            )),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct MetricPoint {
    pub timestamp: String,
    pub value: f64,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct NetworkTraffic {
    #[serde(rename = "in", default)]
    pub inbound: Vec<MetricPoint>,
    #[serde(rename = "out", default)]
    pub outbound: Vec<MetricPoint>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct SystemMetrics {
    #[serde(default)]
    pub cpu_usage: Vec<MetricPoint>,
    #[serde(default)]
    pub memory_usage: Vec<MetricPoint>,
    #[serde(default)]
    pub disk_usage: Vec<MetricPoint>,
    #[serde(default)]
    pub network_traffic: NetworkTraffic,
}

impl SystemMetrics {
    /// Most recent CPU, memory and disk readings, if any were returned.
    pub fn latest(&self) -> (Option<f64>, Option<f64>, Option<f64>) {
        let last = |series: &[MetricPoint]| series.last().map(|p| p.value);
        (
            last(&self.cpu_usage),
            last(&self.memory_usage),
            last(&self.disk_usage),
        )
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            other => Err(format!("unknown log level '{}'", other)),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LogEntry {
    pub timestamp: String,
    pub level: LogLevel,
    pub service: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LogPage {
    pub logs: Vec<LogEntry>,
    pub total: u64,
    pub has_more: bool,
}

/// Filters for the log search endpoint. Unset fields are left off the query.
#[derive(Debug, Serialize, Clone, Default)]
pub struct LogQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<LogLevel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AlertRule {
    pub id: String,
    pub name: String,
    pub condition: String,
    pub threshold: f64,
    pub enabled: bool,
    #[serde(default)]
    pub notification_channels: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Alert {
    pub id: String,
    pub rule_name: String,
    pub severity: Severity,
    pub message: String,
    pub started_at: String,
    #[serde(default)]
    pub resolved_at: Option<String>,
}

/// Embeddable dashboard link handed out by the gateway.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GrafanaUrl {
    pub url: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PrometheusData {
    #[serde(rename = "resultType")]
    pub result_type: String,
    #[serde(default)]
    pub result: Vec<Value>,
}

/// Result of an ad-hoc PromQL query proxied through the gateway.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PrometheusResult {
    pub status: String,
    pub data: PrometheusData,
}
