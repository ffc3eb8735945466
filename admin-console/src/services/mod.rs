pub mod api_client;
pub mod auth_client;
pub mod endpoints;
pub mod error;
pub mod gateway_client;
pub mod monitoring_client;
pub mod user_client;
pub mod vm_client;

pub use api_client::{ApiRequest, RequestPipeline, Upstream};
pub use auth_client::AuthClient;
pub use error::ApiError;
pub use gateway_client::GatewayClient;
pub use monitoring_client::MonitoringClient;
pub use user_client::UserManagementClient;
pub use vm_client::VmClient;
