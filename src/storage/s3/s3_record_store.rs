use crate::common::election::MasterElectionRecord;
use crate::common::error::RecordStoreError;
use crate::common::health::HealthCheckRecord;
use crate::storage::s3::s3_client::S3Client;
use crate::traits::record_store::UnsendRecordStore;

pub struct S3RecordStore {
    client: S3Client,
    bucket: String,
    prefix: String,
}

impl S3RecordStore {
    pub fn new(client: S3Client, bucket: &str, prefix: &str) -> Self {
        S3RecordStore {
            client,
            bucket: bucket.to_string(),
            prefix: prefix.to_string(),
        }
    }

    fn election_key(&self, scaling_group_id: &str) -> String {
        format!("{}/master_election/{}.json", self.prefix, scaling_group_id)
    }

    fn health_check_key(&self, instance_id: &str) -> String {
        format!("{}/health_check/{}.json", self.prefix, instance_id)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, key: &str) -> Result<Option<(T, String)>, RecordStoreError> {
        match self.client.get_object(&self.bucket, key).await? {
            Some((data, etag)) => {
                let record = serde_json::from_slice(&data)?;
                Ok(Some((record, etag)))
            }
            None => Ok(None),
        }
    }
}

impl UnsendRecordStore for S3RecordStore {
    async fn get_election_record(&self, scaling_group_id: &str) -> Result<Option<MasterElectionRecord>, RecordStoreError> {
        let key = self.election_key(scaling_group_id);
        Ok(self.get_json(&key).await?.map(|(record, _)| record))
    }

    async fn create_election_record(&self, record: &MasterElectionRecord) -> Result<(), RecordStoreError> {
        let key = self.election_key(&record.scaling_group_id);
        let body = serde_json::to_vec(record)?;
        self.client.put_object(&self.bucket, &key, &body, None).await
    }

    async fn update_election_record(&self, record: &MasterElectionRecord) -> Result<(), RecordStoreError> {
        let key = self.election_key(&record.scaling_group_id);
        let current: (MasterElectionRecord, String) = self.get_json(&key).await?
            .ok_or_else(|| RecordStoreError::Conflict { key: key.clone() })?;
        let (stored, etag) = current;
        if stored.version + 1 != record.version {
            log::debug!(
                "Version mismatch on {}: stored {} incoming {}",
                key, stored.version, record.version
            );
            return Err(RecordStoreError::Conflict { key });
        }
        let body = serde_json::to_vec(record)?;
        self.client.put_object(&self.bucket, &key, &body, Some(etag)).await
    }

    async fn get_health_check_record(&self, instance_id: &str) -> Result<Option<HealthCheckRecord>, RecordStoreError> {
        let key = self.health_check_key(instance_id);
        Ok(self.get_json(&key).await?.map(|(record, _)| record))
    }

    async fn put_health_check_record(&self, record: &HealthCheckRecord) -> Result<(), RecordStoreError> {
        let key = self.health_check_key(&record.instance_id);
        let body = serde_json::to_vec(record)?;
        if record.version == 1 {
            return self.client.put_object(&self.bucket, &key, &body, None).await;
        }
        let current: (HealthCheckRecord, String) = self.get_json(&key).await?
            .ok_or_else(|| RecordStoreError::Conflict { key: key.clone() })?;
        let (stored, etag) = current;
        if stored.version + 1 != record.version {
            log::debug!(
                "Version mismatch on {}: stored {} incoming {}",
                key, stored.version, record.version
            );
            return Err(RecordStoreError::Conflict { key });
        }
        self.client.put_object(&self.bucket, &key, &body, Some(etag)).await
    }

    async fn delete_health_check_record(&self, instance_id: &str) -> Result<(), RecordStoreError> {
        let key = self.health_check_key(instance_id);
        if self.client.get_object(&self.bucket, &key).await?.is_none() {
            return Err(RecordStoreError::NotFound { key });
        }
        self.client.delete_object(&self.bucket, &key).await
    }

    async fn list_election_records(&self) -> Result<Vec<MasterElectionRecord>, RecordStoreError> {
        let prefix = format!("{}/master_election/", self.prefix);
        let keys = self.client.list_objects(&self.bucket, &prefix).await?;
        let mut records = Vec::new();
        for key in keys {
            if let Some((record, _etag)) = self.get_json::<MasterElectionRecord>(&key).await? {
                records.push(record);
            }
        }
        Ok(records)
    }

    async fn list_health_check_records(&self) -> Result<Vec<HealthCheckRecord>, RecordStoreError> {
        let prefix = format!("{}/health_check/", self.prefix);
        let keys = self.client.list_objects(&self.bucket, &prefix).await?;
        let mut records = Vec::new();
        for key in keys {
            if let Some((record, _etag)) = self.get_json::<HealthCheckRecord>(&key).await? {
                records.push(record);
            }
        }
        Ok(records)
    }
}
