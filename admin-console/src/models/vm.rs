use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum VmStatus {
    Active,
    Stopped,
    Error,
    Building,
}

impl fmt::Display for VmStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            VmStatus::Active => "active",
            VmStatus::Stopped => "stopped",
            VmStatus::Error => "error",
            VmStatus::Building => "building",
        };
        f.pad(s)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct IpAddresses {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct VmSpecs {
    pub vcpus: u32,
    /// MB.
    pub ram: u64,
    /// GB.
    pub disk: u64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct VirtualMachine {
    pub id: String,
    pub name: String,
    pub status: VmStatus,
    pub flavor: String,
    pub image: String,
    #[serde(default)]
    pub networks: Vec<String>,
    pub user_id: String,
    pub user_name: String,
    pub created_at: String,
    pub updated_at: String,
    #[serde(default)]
    pub ip_addresses: IpAddresses,
    pub specs: VmSpecs,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct VmConsole {
    pub console_url: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct VmFlavor {
    pub id: String,
    pub name: String,
    pub vcpus: u32,
    pub ram: u64,
    pub disk: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ImageStatus {
    Active,
    Inactive,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct VmImage {
    pub id: String,
    pub name: String,
    pub status: ImageStatus,
    pub size: u64,
    pub created_at: String,
    pub min_disk: u64,
    pub min_ram: u64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct VmNetwork {
    pub id: String,
    pub name: String,
    pub subnet_id: String,
    pub cidr: String,
    pub gateway_ip: String,
}

/// Platform-wide capacity against current allocation.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResourceUsage {
    pub total_vcpus: u64,
    pub used_vcpus: u64,
    pub total_ram: u64,
    pub used_ram: u64,
    pub total_storage: u64,
    pub used_storage: u64,
    pub total_instances: u64,
    pub used_instances: u64,
}

impl ResourceUsage {
    /// `used / total` as a percentage; zero when nothing is provisioned.
    pub fn percent(used: u64, total: u64) -> f64 {
        if total == 0 {
            return 0.0;
        }
        used as f64 * 100.0 / total as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_vm_without_addresses_decodes() {
        let vm: VirtualMachine = serde_json::from_value(json!({
            "id": "vm-1",
            "name": "build-box",
            "status": "building",
            "flavor": "m1.small",
            "image": "ubuntu-22.04",
            "user_id": "u-1",
            "user_name": "alice",
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z",
            "specs": {"vcpus": 2, "ram": 2048, "disk": 20},
        }))
        .unwrap();

        assert_eq!(vm.status, VmStatus::Building);
        assert!(vm.networks.is_empty());
        assert_eq!(vm.ip_addresses, IpAddresses::default());
        assert_eq!(vm.specs.ram, 2048);
    }

    #[test]
    fn test_usage_percent_handles_empty_pool() {
        assert_eq!(ResourceUsage::percent(5, 0), 0.0);
        assert_eq!(ResourceUsage::percent(4, 16), 25.0);
    }
}
