use serde::{Deserialize, Serialize};

/// License model of an appliance. Failover rights differ between the two:
/// a BYOL instance may unilaterally replace a dead master, a PAYG instance
/// may not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LicenseType {
    Byol,
    Payg,
}

impl LicenseType {
    pub fn can_initiate_failover(&self) -> bool {
        matches!(self, LicenseType::Byol)
    }
}

/// A running appliance in a scaling group, as described by its own
/// heartbeat callback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instance {
    pub instance_id: String,
    pub scaling_group_id: String,
    pub primary_private_ip: String,
    pub license_type: LicenseType,
    pub launch_time_ms: Option<i64>,
}
