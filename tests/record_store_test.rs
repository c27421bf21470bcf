use serverless_autoscale_coordinator::common::election::{MasterElectionRecord, VoteState};
use serverless_autoscale_coordinator::common::error::RecordStoreError;
use serverless_autoscale_coordinator::common::health::HealthCheckRecord;
use serverless_autoscale_coordinator::common::instance::{Instance, LicenseType};
use serverless_autoscale_coordinator::storage::file::file_record_store::FileRecordStore;
use serverless_autoscale_coordinator::storage::record_store_impl::RecordStoreImpl;
use serverless_autoscale_coordinator::traits::record_store::RecordStore;

fn file_store(dir: &tempfile::TempDir) -> RecordStoreImpl {
    RecordStoreImpl::File(FileRecordStore::new(dir.path()))
}

fn instance(id: &str, group: &str, ip: &str) -> Instance {
    Instance {
        instance_id: id.to_string(),
        scaling_group_id: group.to_string(),
        primary_private_ip: ip.to_string(),
        license_type: LicenseType::Byol,
        launch_time_ms: None,
    }
}

#[tokio::test]
async fn election_record_create_is_first_writer_wins() {
    let dir = tempfile::tempdir().unwrap();
    let store = file_store(&dir);

    let first = MasterElectionRecord::new_pending(&instance("i-a", "asg-1", "10.0.0.1"), 1_000, 90_000);
    let second = MasterElectionRecord::new_pending(&instance("i-b", "asg-1", "10.0.0.2"), 1_001, 90_000);

    store.create_election_record(&first).await.unwrap();
    let err = store.create_election_record(&second).await.unwrap_err();
    assert!(matches!(err, RecordStoreError::Conflict { .. }));

    let stored = store.get_election_record("asg-1").await.unwrap().unwrap();
    assert_eq!(stored.instance_id, "i-a");
    assert_eq!(stored.version, 1);
}

#[tokio::test]
async fn election_record_update_requires_the_next_version() {
    let dir = tempfile::tempdir().unwrap();
    let store = file_store(&dir);

    let pending = MasterElectionRecord::new_pending(&instance("i-a", "asg-1", "10.0.0.1"), 1_000, 90_000);
    store.create_election_record(&pending).await.unwrap();

    let mut done = pending.clone();
    done.vote_state = VoteState::Done;
    done.version = 2;
    store.update_election_record(&done).await.unwrap();

    // replaying the same update must lose now that the version moved on
    let err = store.update_election_record(&done).await.unwrap_err();
    assert!(matches!(err, RecordStoreError::Conflict { .. }));

    // skipping ahead is rejected as well
    let mut skipped = done.clone();
    skipped.version = 4;
    let err = store.update_election_record(&skipped).await.unwrap_err();
    assert!(matches!(err, RecordStoreError::Conflict { .. }));

    let stored = store.get_election_record("asg-1").await.unwrap().unwrap();
    assert_eq!(stored.version, 2);
    assert_eq!(stored.vote_state, VoteState::Done);
}

#[tokio::test]
async fn election_record_update_without_existing_record_is_a_conflict() {
    let dir = tempfile::tempdir().unwrap();
    let store = file_store(&dir);

    let mut record = MasterElectionRecord::new_pending(&instance("i-a", "asg-1", "10.0.0.1"), 1_000, 90_000);
    record.version = 2;
    let err = store.update_election_record(&record).await.unwrap_err();
    assert!(matches!(err, RecordStoreError::Conflict { .. }));
}

#[tokio::test]
async fn health_check_record_put_guards_versions() {
    let dir = tempfile::tempdir().unwrap();
    let store = file_store(&dir);

    let v1 = HealthCheckRecord::first_heartbeat(&instance("i-a", "asg-1", "10.0.0.1"), 1_000, 30_000, 3);
    store.put_health_check_record(&v1).await.unwrap();

    // a concurrent first heartbeat may not clobber the record
    let err = store.put_health_check_record(&v1).await.unwrap_err();
    assert!(matches!(err, RecordStoreError::Conflict { .. }));

    let mut v2 = v1.clone();
    v2.version = 2;
    v2.heartbeat_loss_count = 1;
    store.put_health_check_record(&v2).await.unwrap();

    let err = store.put_health_check_record(&v2).await.unwrap_err();
    assert!(matches!(err, RecordStoreError::Conflict { .. }));

    let stored = store.get_health_check_record("i-a").await.unwrap().unwrap();
    assert_eq!(stored.version, 2);
    assert_eq!(stored.heartbeat_loss_count, 1);
}

#[tokio::test]
async fn deleting_a_missing_health_check_record_reports_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let store = file_store(&dir);

    let err = store.delete_health_check_record("i-missing").await.unwrap_err();
    assert!(matches!(err, RecordStoreError::NotFound { .. }));
}

#[tokio::test]
async fn delete_then_get_returns_none() {
    let dir = tempfile::tempdir().unwrap();
    let store = file_store(&dir);

    let record = HealthCheckRecord::first_heartbeat(&instance("i-a", "asg-1", "10.0.0.1"), 1_000, 30_000, 3);
    store.put_health_check_record(&record).await.unwrap();
    store.delete_health_check_record("i-a").await.unwrap();

    assert!(store.get_health_check_record("i-a").await.unwrap().is_none());
}

#[tokio::test]
async fn missing_records_read_as_none() {
    let dir = tempfile::tempdir().unwrap();
    let store = file_store(&dir);

    assert!(store.get_election_record("asg-none").await.unwrap().is_none());
    assert!(store.get_health_check_record("i-none").await.unwrap().is_none());
}

#[tokio::test]
async fn listing_returns_every_stored_record() {
    let dir = tempfile::tempdir().unwrap();
    let store = file_store(&dir);

    for (group, id, ip) in [("asg-1", "i-a", "10.0.0.1"), ("asg-2", "i-b", "10.0.0.2")] {
        let election = MasterElectionRecord::new_pending(&instance(id, group, ip), 1_000, 90_000);
        store.create_election_record(&election).await.unwrap();
        let health = HealthCheckRecord::first_heartbeat(&instance(id, group, ip), 1_000, 30_000, 3);
        store.put_health_check_record(&health).await.unwrap();
    }

    let elections = store.list_election_records().await.unwrap();
    assert_eq!(elections.len(), 2);
    let healths = store.list_health_check_records().await.unwrap();
    assert_eq!(healths.len(), 2);
}
