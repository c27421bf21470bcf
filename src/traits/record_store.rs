use crate::common::{
    election::MasterElectionRecord,
    error::RecordStoreError,
    health::HealthCheckRecord,
};

/// Shared persistent store holding one election record per scaling group
/// and one health record per instance. All mutations are conditional:
/// creates fail with `Conflict` when the key already exists, updates fail
/// with `Conflict` unless the stored record still carries the version the
/// incoming record was derived from (incoming version == stored + 1).
/// There is no blind overwrite.
#[trait_variant::make(RecordStore: Send)]
pub trait UnsendRecordStore {
    async fn get_election_record(&self, scaling_group_id: &str) -> Result<Option<MasterElectionRecord>, RecordStoreError>;
    async fn create_election_record(&self, record: &MasterElectionRecord) -> Result<(), RecordStoreError>;
    async fn update_election_record(&self, record: &MasterElectionRecord) -> Result<(), RecordStoreError>;
    async fn get_health_check_record(&self, instance_id: &str) -> Result<Option<HealthCheckRecord>, RecordStoreError>;
    async fn put_health_check_record(&self, record: &HealthCheckRecord) -> Result<(), RecordStoreError>;
    async fn delete_health_check_record(&self, instance_id: &str) -> Result<(), RecordStoreError>;
    async fn list_election_records(&self) -> Result<Vec<MasterElectionRecord>, RecordStoreError>;
    async fn list_health_check_records(&self) -> Result<Vec<HealthCheckRecord>, RecordStoreError>;
}
