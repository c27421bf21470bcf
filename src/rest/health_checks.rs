use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use crate::common::health::HealthCheckRecord;
use crate::traits::record_store::RecordStore;
use crate::server::server::AppState;

pub async fn get_health_checks(State(st): State<AppState>) -> Json<serde_json::Value> {
    let records = &st.record_store.list_health_check_records().await.unwrap_or_default();
    log::debug!("Retrieved health check records: {:?}", records);

    Json(serde_json::json!({
        "healthChecks": records.iter().map(health_check_json).collect::<Vec<_>>()
    }))
}

pub async fn get_health_check(
    State(st): State<AppState>,
    Path(instance_id): Path<String>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    match st.record_store.get_health_check_record(&instance_id).await {
        Ok(Some(record)) => Ok(Json(health_check_json(&record))),
        Ok(None) => Err(StatusCode::NOT_FOUND),
        Err(e) => {
            log::error!("Failed to read health check record for {}: {:?}", instance_id, e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

fn health_check_json(record: &HealthCheckRecord) -> serde_json::Value {
    serde_json::json!({
        "instanceId": record.instance_id,
        "scalingGroupId": record.scaling_group_id,
        "ip": record.ip,
        "healthy": record.healthy,
        "heartbeatLossCount": record.heartbeat_loss_count,
        "syncState": record.sync_state,
        "nextHeartbeatTime": record.next_heartbeat_time_ms,
        "heartbeatInterval": record.heartbeat_interval_ms,
        "maxHeartbeatLossCount": record.max_heartbeat_loss_count,
    })
}
