use axum::{Json, Router, extract::State, routing::{get, post}};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::error;

use crate::rest::{
    health_checks::{get_health_check, get_health_checks},
    heartbeat::post_heartbeat,
    masters::get_masters,
};
use crate::{
    common::config::{
        CoordinatorSettings, ServerConfig, load_coordinator_settings, load_server_config,
    },
    gateway::gateway_impl::ScalingGroupGatewayImpl,
    server::loader::{load_record_store, load_scaling_group_gateway},
    storage::record_store_impl::RecordStoreImpl,
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub settings: Arc<CoordinatorSettings>,
    pub record_store: Arc<RecordStoreImpl>,
    pub scaling_group: Arc<ScalingGroupGatewayImpl>,
}

pub async fn server_start(config_path: &str) -> anyhow::Result<()> {
    env_logger::init();
    log::info!("Starting autoscale coordinator...");
    let server_config_load = Arc::new(load_server_config()?);
    let settings_load = Arc::new(load_coordinator_settings(config_path)?);

    let record_store = Arc::new(load_record_store(&server_config_load).await?);
    let scaling_group = Arc::new(load_scaling_group_gateway(&server_config_load)?);

    let state = AppState {
        config: Arc::clone(&server_config_load),
        settings: settings_load,
        record_store,
        scaling_group,
    };
    let app = build_router(state);

    let addr = format!("{}:{}", server_config_load.host, server_config_load.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    log::info!("Coordinator listening on {}", addr);
    axum::serve(listener, app).await.map_err(|e| {
        error!("Failed to start server: {}", e);
        anyhow::anyhow!("Server error: {}", e)
    })?;

    Ok(())
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(health))
        .route("/heartbeat", post(post_heartbeat))
        .route("/masters", get(get_masters))
        .route("/healthchecks", get(get_health_checks))
        .route("/healthchecks/:instance_id", get(get_health_check))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health(State(st): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "config": {
            "election_timeout_ms": st.settings.election_timeout_ms,
            "heartbeat_interval_ms": st.settings.heartbeat_interval_ms,
        }
    }))
}
