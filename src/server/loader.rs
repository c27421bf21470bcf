use crate::storage::{
    file::file_record_store::FileRecordStore,
    record_store_impl::RecordStoreImpl,
    s3::s3_record_store::S3RecordStore,
    s3::s3_client::S3Client,
    redis::redis_record_store::RedisRecordStore,
    redis::redis_client::RedisClient,
};
use crate::gateway::{
    gateway_impl::ScalingGroupGatewayImpl,
    log_gateway::LogScalingGroupGateway,
    memory_gateway::MemoryScalingGroupGateway,
};
use crate::common::config::{GatewayType, ServerConfig, StorageType};
use anyhow::Result;
use tokio::sync::Mutex;
use std::{
    sync::Arc,
};
use redis::cluster::ClusterClient;

pub async fn load_record_store(server_config: &ServerConfig) -> Result<RecordStoreImpl> {
    let record_store_load = match &server_config.record_store_type {
        StorageType::S3 => {
            log::debug!("Using S3 record store");
            let bucket = server_config.record_store_s3_bucket.clone().ok_or_else(|| anyhow::anyhow!("S3 bucket not configured"))?;
            let prefix = server_config.record_store_s3_prefix.clone().unwrap_or_else(|| "coordinator".to_string());
            let endpoint = server_config.record_store_s3_endpoint.clone().unwrap_or_else(|| "https://s3.amazonaws.com".to_string());
            let access_key = server_config.record_store_s3_access_key.clone().ok_or_else(|| anyhow::anyhow!("S3 access key not configured"))?;
            let secret_key = server_config.record_store_s3_secret_key.clone().ok_or_else(|| anyhow::anyhow!("S3 secretkey not configured"))?;
            let region = server_config.record_store_s3_region.clone().unwrap_or_else(|| "us-east-1".to_string());
            let s3_client = S3Client::new(&endpoint, &access_key, &secret_key, &region).await?;
            RecordStoreImpl::S3(S3RecordStore::new(s3_client, &bucket, &prefix))
        },
        StorageType::File => {
            log::debug!("Using File record store");
            RecordStoreImpl::File(FileRecordStore::new(&server_config.record_store_file_dir))
        },
        StorageType::Redis => {
            log::debug!("Using Redis record store");
            let redis_urls = server_config.record_store_redis_urls
                .as_ref()
                .cloned()
                .unwrap_or_default()
                .split(',')
                .map(|s| s.trim().to_string())
                .collect::<Vec<String>>();
            let redis_client: RedisClient = if redis_urls.len() > 1 {
                log::debug!("Using Redis Cluster with URLs: {:?}", redis_urls);
                let client = ClusterClient::new(redis_urls)?;
                let conn = client.get_async_connection().await?;
                RedisClient::new(true, Some(Arc::new(Mutex::new(conn))), None)
            } else {
                log::debug!("Using single Redis instance at: {}", redis_urls[0]);
                let client = redis::Client::open(redis_urls[0].clone())?;
                let conn = client.get_multiplexed_async_connection().await?;
                RedisClient::new(false, None, Some(Arc::new(Mutex::new(conn))))
            };
            RecordStoreImpl::Redis(RedisRecordStore::new(redis_client))
        }
    };
    Ok(record_store_load)
}

pub fn load_scaling_group_gateway(server_config: &ServerConfig) -> Result<ScalingGroupGatewayImpl> {
    let gateway_load = match &server_config.scaling_group_gateway {
        GatewayType::Log => {
            log::debug!("Using log scaling group gateway");
            ScalingGroupGatewayImpl::Log(LogScalingGroupGateway::new())
        },
        GatewayType::Memory => {
            log::debug!("Using in-memory scaling group gateway");
            ScalingGroupGatewayImpl::Memory(MemoryScalingGroupGateway::new())
        },
    };
    Ok(gateway_load)
}
