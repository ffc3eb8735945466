use super::api_client::{ApiRequest, RequestPipeline, Upstream};
use super::endpoints::vm;
use super::error::ApiError;
use crate::models::{ResourceUsage, VirtualMachine, VmConsole, VmFlavor, VmImage, VmNetwork};

/// Read-only view of virtual machines and the compute resources behind them.
#[derive(Clone)]
pub struct VmClient {
    pipeline: RequestPipeline,
}

impl VmClient {
    pub fn new(pipeline: RequestPipeline) -> Self {
        Self { pipeline }
    }

    pub async fn vms(&self) -> Result<Vec<VirtualMachine>, ApiError> {
        self.get(vm::VMS).await
    }

    pub async fn user_vms(&self, user_id: &str) -> Result<Vec<VirtualMachine>, ApiError> {
        self.get(vm::user_vms(user_id)).await
    }

    pub async fn vm(&self, id: &str) -> Result<VirtualMachine, ApiError> {
        self.get(vm::vm(id)).await
    }

    pub async fn vm_console(&self, id: &str) -> Result<VmConsole, ApiError> {
        self.get(vm::vm_console(id)).await
    }

    pub async fn flavors(&self) -> Result<Vec<VmFlavor>, ApiError> {
        self.get(vm::FLAVORS).await
    }

    pub async fn images(&self) -> Result<Vec<VmImage>, ApiError> {
        self.get(vm::IMAGES).await
    }

    pub async fn networks(&self) -> Result<Vec<VmNetwork>, ApiError> {
        self.get(vm::NETWORKS).await
    }

    pub async fn resource_usage(&self) -> Result<ResourceUsage, ApiError> {
        self.get(vm::RESOURCE_USAGE).await
    }

    async fn get<T>(&self, path: impl Into<String>) -> Result<T, ApiError>
    where
        T: serde::de::DeserializeOwned,
    {
        self.pipeline
            .call(Upstream::Gateway, ApiRequest::get(path))
            .await
    }
}
