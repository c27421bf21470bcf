use crate::common::election::MasterElectionRecord;
use crate::common::error::RecordStoreError;
use crate::common::health::HealthCheckRecord;
use crate::storage::file::file_record_store::FileRecordStore;
use crate::storage::redis::redis_record_store::RedisRecordStore;
use crate::storage::s3::s3_record_store::S3RecordStore;
use crate::traits::record_store::{RecordStore, UnsendRecordStore};

pub enum RecordStoreImpl {
    File(FileRecordStore),
    S3(S3RecordStore),
    Redis(RedisRecordStore),
}

impl RecordStore for RecordStoreImpl {
    async fn get_election_record(&self, scaling_group_id: &str) -> Result<Option<MasterElectionRecord>, RecordStoreError> {
        match self {
            RecordStoreImpl::File(f) => f.get_election_record(scaling_group_id).await,
            RecordStoreImpl::S3(s) => s.get_election_record(scaling_group_id).await,
            RecordStoreImpl::Redis(r) => r.get_election_record(scaling_group_id).await,
        }
    }

    async fn create_election_record(&self, record: &MasterElectionRecord) -> Result<(), RecordStoreError> {
        match self {
            RecordStoreImpl::File(f) => f.create_election_record(record).await,
            RecordStoreImpl::S3(s) => s.create_election_record(record).await,
            RecordStoreImpl::Redis(r) => r.create_election_record(record).await,
        }
    }

    async fn update_election_record(&self, record: &MasterElectionRecord) -> Result<(), RecordStoreError> {
        match self {
            RecordStoreImpl::File(f) => f.update_election_record(record).await,
            RecordStoreImpl::S3(s) => s.update_election_record(record).await,
            RecordStoreImpl::Redis(r) => r.update_election_record(record).await,
        }
    }

    async fn get_health_check_record(&self, instance_id: &str) -> Result<Option<HealthCheckRecord>, RecordStoreError> {
        match self {
            RecordStoreImpl::File(f) => f.get_health_check_record(instance_id).await,
            RecordStoreImpl::S3(s) => s.get_health_check_record(instance_id).await,
            RecordStoreImpl::Redis(r) => r.get_health_check_record(instance_id).await,
        }
    }

    async fn put_health_check_record(&self, record: &HealthCheckRecord) -> Result<(), RecordStoreError> {
        match self {
            RecordStoreImpl::File(f) => f.put_health_check_record(record).await,
            RecordStoreImpl::S3(s) => s.put_health_check_record(record).await,
            RecordStoreImpl::Redis(r) => r.put_health_check_record(record).await,
        }
    }

    async fn delete_health_check_record(&self, instance_id: &str) -> Result<(), RecordStoreError> {
        match self {
            RecordStoreImpl::File(f) => f.delete_health_check_record(instance_id).await,
            RecordStoreImpl::S3(s) => s.delete_health_check_record(instance_id).await,
            RecordStoreImpl::Redis(r) => r.delete_health_check_record(instance_id).await,
        }
    }

    async fn list_election_records(&self) -> Result<Vec<MasterElectionRecord>, RecordStoreError> {
        match self {
            RecordStoreImpl::File(f) => f.list_election_records().await,
            RecordStoreImpl::S3(s) => s.list_election_records().await,
            RecordStoreImpl::Redis(r) => r.list_election_records().await,
        }
    }

    async fn list_health_check_records(&self) -> Result<Vec<HealthCheckRecord>, RecordStoreError> {
        match self {
            RecordStoreImpl::File(f) => f.list_health_check_records().await,
            RecordStoreImpl::S3(s) => s.list_health_check_records().await,
            RecordStoreImpl::Redis(r) => r.list_health_check_records().await,
        }
    }
}
