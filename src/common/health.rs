use crate::common::instance::Instance;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SyncState {
    #[serde(rename = "in-sync")]
    InSync,
    #[serde(rename = "out-of-sync")]
    OutOfSync,
}

/// One health record per instance, rewritten on every heartbeat.
/// `max_heartbeat_loss_count` is stamped from configuration when the
/// record is created so an in-flight record keeps its contract even if
/// the deployment config changes later.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthCheckRecord {
    pub instance_id: String,
    pub scaling_group_id: String,
    pub ip: String,
    pub healthy: bool,
    pub heartbeat_loss_count: u32,
    pub sync_state: SyncState,
    pub next_heartbeat_time_ms: i64,
    pub heartbeat_interval_ms: i64,
    pub max_heartbeat_loss_count: u32,
    pub version: u64,
}

impl HealthCheckRecord {
    pub fn first_heartbeat(
        instance: &Instance,
        arrival_ms: i64,
        heartbeat_interval_ms: i64,
        max_heartbeat_loss_count: u32,
    ) -> Self {
        Self {
            instance_id: instance.instance_id.clone(),
            scaling_group_id: instance.scaling_group_id.clone(),
            ip: instance.primary_private_ip.clone(),
            healthy: true,
            heartbeat_loss_count: 0,
            sync_state: SyncState::InSync,
            next_heartbeat_time_ms: arrival_ms + heartbeat_interval_ms,
            heartbeat_interval_ms,
            max_heartbeat_loss_count,
            version: 1,
        }
    }

    pub fn is_out_of_sync(&self) -> bool {
        self.sync_state == SyncState::OutOfSync
    }
}
