use axum::{
    extract::State,
    Json,
};
use crate::traits::record_store::RecordStore;
use crate::server::server::AppState;

pub async fn get_masters(State(st): State<AppState>) -> Json<serde_json::Value> {
    let records = &st.record_store.list_election_records().await.unwrap_or_default();
    log::debug!("Retrieved election records: {:?}", records);

    Json(serde_json::json!({
        "masters": records.iter().map(|record| {
            serde_json::json!({
                "scalingGroupId": record.scaling_group_id,
                "instanceId": record.instance_id,
                "ip": record.ip,
                "voteState": record.vote_state,
                "voteStartTime": record.vote_start_time_ms,
                "voteEndTime": record.vote_end_time_ms,
            })
        }).collect::<Vec<_>>()
    }))
}
