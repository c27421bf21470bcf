use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use uuid::Uuid;

use crate::handler::context::HandlerContext;
use crate::handler::heartbeat_sync::{handle_heartbeat_request, HeartbeatResponse};
use crate::common::request::HeartbeatRequest;
use crate::server::server::AppState;

/// Heartbeat callback endpoint. Responds 200 with either the master ip
/// (first heartbeat only) or an empty body, 400 on a body that cannot
/// be used, and 500 when the store or the scaling group gateway failed.
pub async fn post_heartbeat(
    State(st): State<AppState>,
    payload: Result<Json<HeartbeatRequest>, JsonRejection>,
) -> (StatusCode, String) {
    let request_id = Uuid::new_v4();
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            log::warn!("[{}] Rejected unparseable heartbeat callback: {}", request_id, rejection);
            return (StatusCode::BAD_REQUEST, String::new());
        }
    };
    if let Err(e) = request.validate() {
        log::warn!("[{}] Rejected heartbeat callback: {}", request_id, e);
        return (StatusCode::BAD_REQUEST, String::new());
    }

    log::debug!(
        "[{}] Heartbeat from {} in {}",
        request_id,
        request.instance_id,
        request.scaling_group_id
    );
    let ctx = HandlerContext {
        record_store: st.record_store.clone(),
        scaling_group: st.scaling_group.clone(),
        settings: st.settings.clone(),
    };
    match handle_heartbeat_request(&ctx, &request).await {
        Ok(HeartbeatResponse::MasterIp(ip)) => (
            StatusCode::OK,
            serde_json::json!({ "master-ip": ip }).to_string(),
        ),
        Ok(HeartbeatResponse::Empty) => (StatusCode::OK, String::new()),
        Err(e) => {
            log::error!("[{}] Heartbeat handling failed: {:?}", request_id, e);
            (StatusCode::INTERNAL_SERVER_ERROR, String::new())
        }
    }
}
