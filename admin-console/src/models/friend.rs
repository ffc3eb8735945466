use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FriendStatus {
    Active,
    Suspended,
    Pending,
}

impl fmt::Display for FriendStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FriendStatus::Active => "active",
            FriendStatus::Suspended => "suspended",
            FriendStatus::Pending => "pending",
        };
        f.pad(s)
    }
}

/// Limits granted to an invited user. RAM and storage in GB.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
pub struct VmQuota {
    pub max_instances: u32,
    pub max_vcpus: u32,
    pub max_ram: u64,
    pub max_storage: u64,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
pub struct VmUsage {
    pub instances: u32,
    pub vcpus: u32,
    pub ram: u64,
    pub storage: u64,
}

/// A user invited onto the platform by an administrator.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct FriendUser {
    pub id: String,
    pub username: String,
    pub email: String,
    pub display_name: String,
    pub status: FriendStatus,
    pub vm_quota: VmQuota,
    #[serde(default)]
    pub vm_usage: VmUsage,
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_login: Option<String>,
}

impl FriendUser {
    /// Whether the user has reached their instance limit.
    pub fn at_instance_quota(&self) -> bool {
        self.vm_usage.instances >= self.vm_quota.max_instances
    }
}
