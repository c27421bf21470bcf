use crate::common::election::MasterElectionRecord;
use crate::common::error::RecordStoreError;
use crate::common::health::HealthCheckRecord;
use crate::storage::redis::redis_client::RedisClient;
use crate::traits::record_store::UnsendRecordStore;

const LOCK_MAX_RETRIES: i64 = 5;
const LOCK_RETRY_DELAY_MS: u64 = 50;
const LOCK_TTL_SECS: i64 = 5;

pub struct RedisRecordStore {
    client: RedisClient,
}

impl RedisRecordStore {
    pub fn new(client: RedisClient) -> Self {
        RedisRecordStore { client }
    }

    fn election_key(&self, scaling_group_id: &str) -> String {
        format!("coordinator:master_election:{}", scaling_group_id)
    }

    fn health_check_key(&self, instance_id: &str) -> String {
        format!("coordinator:health_check:{}", instance_id)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, key: &str) -> Result<Option<T>, RecordStoreError> {
        let raw: Option<String> = self.client.get(key).await?;
        match raw {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    async fn create_json<T: serde::Serialize>(&self, key: &str, record: &T) -> Result<(), RecordStoreError> {
        let raw = serde_json::to_string(record)?;
        let created = self.client.set_nx(key, raw).await?;
        if !created {
            return Err(RecordStoreError::Conflict { key: key.to_string() });
        }
        Ok(())
    }

    /// Caller must hold the lock for `key`.
    async fn write_versioned<T>(&self, key: &str, record: &T, incoming_version: u64) -> Result<(), RecordStoreError>
    where
        T: serde::Serialize + serde::de::DeserializeOwned + Versioned,
    {
        let stored: T = self.get_json(key).await?
            .ok_or_else(|| RecordStoreError::Conflict { key: key.to_string() })?;
        if stored.version() + 1 != incoming_version {
            log::debug!(
                "Version mismatch on {}: stored {} incoming {}",
                key, stored.version(), incoming_version
            );
            return Err(RecordStoreError::Conflict { key: key.to_string() });
        }
        let raw = serde_json::to_string(record)?;
        self.client.set(key, raw).await?;
        Ok(())
    }

    async fn update_with_lock<T>(&self, key: &str, record: &T, incoming_version: u64) -> Result<(), RecordStoreError>
    where
        T: serde::Serialize + serde::de::DeserializeOwned + Versioned,
    {
        let lock_key = format!("lock:{}", key);
        let acquired = self.client
            .try_acquire_lock(&lock_key, LOCK_MAX_RETRIES, LOCK_RETRY_DELAY_MS, LOCK_TTL_SECS)
            .await?;
        if !acquired {
            return Err(RecordStoreError::Conflict { key: key.to_string() });
        }
        let result = self.write_versioned(key, record, incoming_version).await;
        if let Err(e) = self.client.unlock_exclusive(&lock_key).await {
            log::warn!("Failed to release lock {}: {}", lock_key, e);
        }
        result
    }
}

trait Versioned {
    fn version(&self) -> u64;
}

impl Versioned for MasterElectionRecord {
    fn version(&self) -> u64 {
        self.version
    }
}

impl Versioned for HealthCheckRecord {
    fn version(&self) -> u64 {
        self.version
    }
}

impl UnsendRecordStore for RedisRecordStore {
    async fn get_election_record(&self, scaling_group_id: &str) -> Result<Option<MasterElectionRecord>, RecordStoreError> {
        let key = self.election_key(scaling_group_id);
        self.get_json(&key).await
    }

    async fn create_election_record(&self, record: &MasterElectionRecord) -> Result<(), RecordStoreError> {
        let key = self.election_key(&record.scaling_group_id);
        self.create_json(&key, record).await
    }

    async fn update_election_record(&self, record: &MasterElectionRecord) -> Result<(), RecordStoreError> {
        let key = self.election_key(&record.scaling_group_id);
        self.update_with_lock(&key, record, record.version).await
    }

    async fn get_health_check_record(&self, instance_id: &str) -> Result<Option<HealthCheckRecord>, RecordStoreError> {
        let key = self.health_check_key(instance_id);
        self.get_json(&key).await
    }

    async fn put_health_check_record(&self, record: &HealthCheckRecord) -> Result<(), RecordStoreError> {
        let key = self.health_check_key(&record.instance_id);
        if record.version == 1 {
            return self.create_json(&key, record).await;
        }
        self.update_with_lock(&key, record, record.version).await
    }

    async fn delete_health_check_record(&self, instance_id: &str) -> Result<(), RecordStoreError> {
        let key = self.health_check_key(instance_id);
        let removed = self.client.del(&key).await?;
        if removed == 0 {
            return Err(RecordStoreError::NotFound { key });
        }
        Ok(())
    }

    async fn list_election_records(&self) -> Result<Vec<MasterElectionRecord>, RecordStoreError> {
        let keys = self.client.keys("coordinator:master_election:*").await?;
        let mut records = Vec::new();
        for key in keys {
            if let Some(record) = self.get_json::<MasterElectionRecord>(&key).await? {
                records.push(record);
            }
        }
        Ok(records)
    }

    async fn list_health_check_records(&self) -> Result<Vec<HealthCheckRecord>, RecordStoreError> {
        let keys = self.client.keys("coordinator:health_check:*").await?;
        let mut records = Vec::new();
        for key in keys {
            if let Some(record) = self.get_json::<HealthCheckRecord>(&key).await? {
                records.push(record);
            }
        }
        Ok(records)
    }
}
