pub mod envelope;
pub mod friend;
pub mod gateway;
pub mod monitoring;
pub mod theme;
pub mod user;
pub mod vm;

pub use envelope::{ApiEnvelope, ErrorBody, GENERIC_FAILURE};
pub use friend::{FriendStatus, FriendUser, VmQuota, VmUsage};
pub use gateway::{HealthReport, ServiceInfo, ServiceStatus};
pub use monitoring::{
    Alert, AlertRule, GrafanaUrl, LogEntry, LogLevel, LogPage, LogQuery, MetricPoint,
    PrometheusData, PrometheusResult, Severity, SystemMetrics, TimeRange,
};
pub use theme::Theme;
pub use user::{LoginCredentials, Profile, RegisterData, TokenPair};
pub use vm::{
    ImageStatus, IpAddresses, ResourceUsage, VirtualMachine, VmConsole, VmFlavor, VmImage,
    VmNetwork, VmSpecs, VmStatus,
};
