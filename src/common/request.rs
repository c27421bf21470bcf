use crate::common::instance::{Instance, LicenseType};
use anyhow::Result;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportedRole {
    Master,
    Slave,
}

/// Normalized heartbeat callback body. The appliance self-reports its
/// identity, license and role; `timestamp_ms` and `heartbeat_interval_ms`
/// are optional and fall back to the server clock and the configured
/// default interval.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeartbeatRequest {
    pub instance_id: String,
    pub scaling_group_id: String,
    pub primary_private_ip: String,
    pub license_type: LicenseType,
    pub role: ReportedRole,
    #[serde(default)]
    pub timestamp_ms: Option<i64>,
    #[serde(default)]
    pub heartbeat_interval_ms: Option<i64>,
    #[serde(default)]
    pub launch_time_ms: Option<i64>,
}

impl HeartbeatRequest {
    pub fn validate(&self) -> Result<()> {
        if self.instance_id.trim().is_empty() {
            anyhow::bail!("heartbeat callback is missing the instance id");
        }
        if self.scaling_group_id.trim().is_empty() {
            anyhow::bail!("heartbeat callback is missing the scaling group id");
        }
        if self.primary_private_ip.trim().is_empty() {
            anyhow::bail!("heartbeat callback is missing the primary private ip");
        }
        // a non-positive interval would freeze or rewind the expected
        // heartbeat schedule
        if matches!(self.heartbeat_interval_ms, Some(interval) if interval <= 0) {
            anyhow::bail!("heartbeat callback carries a non-positive heartbeat interval");
        }
        if matches!(self.timestamp_ms, Some(timestamp) if timestamp < 0) {
            anyhow::bail!("heartbeat callback carries a negative timestamp");
        }
        Ok(())
    }

    pub fn instance(&self) -> Instance {
        Instance {
            instance_id: self.instance_id.clone(),
            scaling_group_id: self.scaling_group_id.clone(),
            primary_private_ip: self.primary_private_ip.clone(),
            license_type: self.license_type,
            launch_time_ms: self.launch_time_ms,
        }
    }
}
