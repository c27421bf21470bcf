use anyhow::Result;

use crate::common::error::{GatewayError, RecordStoreError};
use crate::common::request::{HeartbeatRequest, ReportedRole};
use crate::common::utils::now_ms;
use crate::handler::context::HandlerContext;
use crate::handler::health_tracker::update_health_check_record;
use crate::handler::master_election::resolve_election;
use crate::traits::record_store::RecordStore;
use crate::traits::scaling_group::ScalingGroupGateway;

/// Outcome reported back to the heartbeating appliance. The master ip
/// is only handed out once, on an instance's very first heartbeat;
/// every later heartbeat is acknowledged with an empty body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeartbeatResponse {
    MasterIp(String),
    Empty,
}

pub async fn handle_heartbeat_request(
    ctx: &HandlerContext,
    request: &HeartbeatRequest,
) -> Result<HeartbeatResponse> {
    let instance = request.instance();
    let arrival_ms = request.timestamp_ms.unwrap_or_else(now_ms);

    let previous = ctx
        .record_store
        .get_health_check_record(&instance.instance_id)
        .await?;
    let first_sync = previous.is_none();
    let was_healthy = previous.as_ref().map(|record| record.healthy).unwrap_or(true);

    let updated = update_health_check_record(
        previous.as_ref(),
        &instance,
        arrival_ms,
        request.heartbeat_interval_ms,
        &ctx.settings,
    );

    let effective = match ctx.record_store.put_health_check_record(&updated).await {
        Ok(()) => updated,
        Err(RecordStoreError::Conflict { .. }) => {
            // A concurrent heartbeat for the same instance got there
            // first. Its bookkeeping is authoritative now.
            log::warn!(
                "Concurrent health update for {}, adopting the stored record",
                instance.instance_id
            );
            ctx.record_store
                .get_health_check_record(&instance.instance_id)
                .await?
                .ok_or_else(|| {
                    anyhow::anyhow!(
                        "health record for {} vanished during a concurrent update",
                        instance.instance_id
                    )
                })?
        }
        Err(e) => return Err(e.into()),
    };

    let election =
        resolve_election(ctx.record_store.as_ref(), &instance, arrival_ms, &ctx.settings).await?;

    if let Some(master_id) = election.master_instance_id() {
        if request.role == ReportedRole::Master && master_id != instance.instance_id {
            log::warn!(
                "Instance {} reports itself as master but the election record names {}",
                instance.instance_id,
                master_id
            );
        }
    }

    if was_healthy && !effective.healthy {
        evict_instance(ctx, &instance.instance_id).await?;
    }

    if first_sync {
        if let Some(ip) = election.master_ip() {
            return Ok(HeartbeatResponse::MasterIp(ip.to_string()));
        }
    }
    Ok(HeartbeatResponse::Empty)
}

/// Removes an instance that just crossed its heartbeat loss ceiling.
/// Runs once per episode, on the request that flipped the record to
/// unhealthy. The health record goes away with the instance so a
/// relaunched one starts a fresh episode.
async fn evict_instance(ctx: &HandlerContext, instance_id: &str) -> Result<()> {
    log::warn!(
        "Instance {} exceeded its heartbeat loss ceiling, removing it from the scaling group",
        instance_id
    );
    match ctx.scaling_group.delete_instance(instance_id).await {
        Ok(()) => {}
        Err(GatewayError::NotFound { .. }) => {
            log::warn!("Instance {} is already gone from the scaling group", instance_id);
        }
        Err(e) => return Err(e.into()),
    }
    match ctx.record_store.delete_health_check_record(instance_id).await {
        Ok(()) => {}
        Err(RecordStoreError::NotFound { .. }) => {}
        Err(e) => return Err(e.into()),
    }
    Ok(())
}
