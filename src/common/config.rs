use std::fs::File;
use std::io::BufReader;

use anyhow::Result;
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageType {
    File,
    S3,
    Redis,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GatewayType {
    Log,
    Memory,
}

/// Process-level configuration, read from the environment (with `.env`
/// support) so deployments can switch backends without a rebuild.
#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_record_store_type")]
    pub record_store_type: StorageType,
    #[serde(default = "default_record_store_file_dir")]
    pub record_store_file_dir: String,
    #[serde(default)]
    pub record_store_s3_bucket: Option<String>,
    #[serde(default)]
    pub record_store_s3_prefix: Option<String>,
    #[serde(default)]
    pub record_store_s3_endpoint: Option<String>,
    #[serde(default)]
    pub record_store_s3_access_key: Option<String>,
    #[serde(default)]
    pub record_store_s3_secret_key: Option<String>,
    #[serde(default)]
    pub record_store_s3_region: Option<String>,
    #[serde(default)]
    pub record_store_redis_urls: Option<String>,
    #[serde(default = "default_scaling_group_gateway")]
    pub scaling_group_gateway: GatewayType,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_record_store_type() -> StorageType {
    StorageType::File
}

fn default_record_store_file_dir() -> String {
    "./data".to_string()
}

fn default_scaling_group_gateway() -> GatewayType {
    GatewayType::Log
}

pub fn load_server_config() -> Result<ServerConfig> {
    dotenv::dotenv().ok();
    let settings = config::Config::builder()
        .add_source(config::Environment::default().try_parsing(true))
        .build()?;
    let server_config = settings.try_deserialize::<ServerConfig>()?;
    Ok(server_config)
}

/// Protocol timing knobs, read from a JSON file passed on the command
/// line. The loss ceiling and the on-time tolerance are deployment
/// configuration, not constants; the ceiling is copied into each health
/// record at creation.
#[derive(Debug, Clone, Deserialize)]
pub struct CoordinatorSettings {
    #[serde(default = "default_election_timeout_ms")]
    pub election_timeout_ms: i64,
    #[serde(default = "default_heartbeat_interval_ms")]
    pub heartbeat_interval_ms: i64,
    #[serde(default = "default_heartbeat_delay_allowance_ms")]
    pub heartbeat_delay_allowance_ms: i64,
    #[serde(default = "default_max_heartbeat_loss_count")]
    pub max_heartbeat_loss_count: u32,
}

impl Default for CoordinatorSettings {
    fn default() -> Self {
        Self {
            election_timeout_ms: default_election_timeout_ms(),
            heartbeat_interval_ms: default_heartbeat_interval_ms(),
            heartbeat_delay_allowance_ms: default_heartbeat_delay_allowance_ms(),
            max_heartbeat_loss_count: default_max_heartbeat_loss_count(),
        }
    }
}

fn default_election_timeout_ms() -> i64 {
    90_000
}

fn default_heartbeat_interval_ms() -> i64 {
    30_000
}

fn default_heartbeat_delay_allowance_ms() -> i64 {
    2_000
}

fn default_max_heartbeat_loss_count() -> u32 {
    3
}

pub fn load_coordinator_settings(path: &str) -> Result<CoordinatorSettings> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let settings = serde_json::from_reader(reader)?;
    Ok(settings)
}
