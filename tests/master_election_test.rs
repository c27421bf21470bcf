use serverless_autoscale_coordinator::common::config::CoordinatorSettings;
use serverless_autoscale_coordinator::common::election::{MasterElectionRecord, VoteState};
use serverless_autoscale_coordinator::common::health::{HealthCheckRecord, SyncState};
use serverless_autoscale_coordinator::common::instance::{Instance, LicenseType};
use serverless_autoscale_coordinator::handler::master_election::resolve_election;
use serverless_autoscale_coordinator::storage::file::file_record_store::FileRecordStore;
use serverless_autoscale_coordinator::storage::record_store_impl::RecordStoreImpl;
use serverless_autoscale_coordinator::traits::record_store::RecordStore;
use tokio::join;

fn settings() -> CoordinatorSettings {
    CoordinatorSettings {
        election_timeout_ms: 90_000,
        heartbeat_interval_ms: 30_000,
        heartbeat_delay_allowance_ms: 2_000,
        max_heartbeat_loss_count: 3,
    }
}

fn byol(id: &str, ip: &str) -> Instance {
    Instance {
        instance_id: id.to_string(),
        scaling_group_id: "asg-1".to_string(),
        primary_private_ip: ip.to_string(),
        license_type: LicenseType::Byol,
        launch_time_ms: None,
    }
}

fn payg(id: &str, ip: &str) -> Instance {
    Instance {
        license_type: LicenseType::Payg,
        ..byol(id, ip)
    }
}

fn file_store(dir: &tempfile::TempDir) -> RecordStoreImpl {
    RecordStoreImpl::File(FileRecordStore::new(dir.path()))
}

/// Seeds an election that concluded some time ago with `master` in charge.
async fn seed_done_master(store: &RecordStoreImpl, master: &Instance, concluded_at_ms: i64) {
    let pending = MasterElectionRecord::new_pending(master, concluded_at_ms - 90_000, 90_000);
    store.create_election_record(&pending).await.unwrap();
    let mut done = pending.clone();
    done.vote_state = VoteState::Done;
    done.version = 2;
    store.update_election_record(&done).await.unwrap();
}

async fn seed_health(store: &RecordStoreImpl, instance: &Instance, healthy: bool, at_ms: i64) {
    let mut record = HealthCheckRecord::first_heartbeat(instance, at_ms, 30_000, 3);
    if !healthy {
        record.healthy = false;
        record.sync_state = SyncState::OutOfSync;
        record.heartbeat_loss_count = 3;
    }
    store.put_health_check_record(&record).await.unwrap();
}

#[tokio::test]
async fn first_heartbeat_opens_a_pending_election() {
    let dir = tempfile::tempdir().unwrap();
    let store = file_store(&dir);
    let me = byol("i-a", "10.0.0.1");

    let result = resolve_election(&store, &me, 1_000, &settings()).await.unwrap();

    assert!(result.new_master_record.is_none());
    assert_eq!(result.candidate_id.as_deref(), Some("i-a"));
    assert_eq!(result.master_ip(), None);

    let stored = store.get_election_record("asg-1").await.unwrap().unwrap();
    assert_eq!(stored.vote_state, VoteState::Pending);
    assert_eq!(stored.instance_id, "i-a");
    assert_eq!(stored.vote_end_time_ms, 1_000 + 90_000);
    assert_eq!(stored.version, 1);
}

#[tokio::test]
async fn no_master_is_reported_while_the_vote_is_open() {
    let dir = tempfile::tempdir().unwrap();
    let store = file_store(&dir);
    let candidate = byol("i-a", "10.0.0.1");
    let other = byol("i-b", "10.0.0.2");

    resolve_election(&store, &candidate, 1_000, &settings()).await.unwrap();
    let result = resolve_election(&store, &other, 5_000, &settings()).await.unwrap();

    assert!(result.new_master_record.is_none());
    assert_eq!(result.master_ip(), None);
    assert_eq!(result.candidate_id.as_deref(), Some("i-a"));

    // the open vote is untouched
    let stored = store.get_election_record("asg-1").await.unwrap().unwrap();
    assert_eq!(stored.version, 1);
    assert_eq!(stored.instance_id, "i-a");
}

#[tokio::test]
async fn the_candidates_own_heartbeat_concludes_the_vote_early() {
    let dir = tempfile::tempdir().unwrap();
    let store = file_store(&dir);
    let candidate = byol("i-a", "10.0.0.1");

    resolve_election(&store, &candidate, 1_000, &settings()).await.unwrap();
    // well inside the 90 s window; the candidate does not wait it out
    let result = resolve_election(&store, &candidate, 31_000, &settings()).await.unwrap();

    assert_eq!(result.master_ip(), Some("10.0.0.1"));
    let new_master = result.new_master_record.as_ref().unwrap();
    assert_eq!(new_master.instance_id, "i-a");

    let stored = store.get_election_record("asg-1").await.unwrap().unwrap();
    assert_eq!(stored.vote_state, VoteState::Done);
    assert_eq!(stored.instance_id, "i-a");
    assert_eq!(stored.version, 2);
}

#[tokio::test]
async fn the_heartbeat_that_sees_the_expired_deadline_takes_the_master_role() {
    let dir = tempfile::tempdir().unwrap();
    let store = file_store(&dir);
    let candidate = byol("i-a", "10.0.0.1");
    let survivor = byol("i-b", "10.0.0.2");

    resolve_election(&store, &candidate, 1_000, &settings()).await.unwrap();
    let result = resolve_election(&store, &survivor, 1_000 + 90_001, &settings()).await.unwrap();

    assert_eq!(result.master_ip(), Some("10.0.0.2"));
    let new_master = result.new_master_record.as_ref().unwrap();
    assert_eq!(new_master.instance_id, "i-b");

    let stored = store.get_election_record("asg-1").await.unwrap().unwrap();
    assert_eq!(stored.vote_state, VoteState::Done);
    assert_eq!(stored.instance_id, "i-b");
    assert_eq!(stored.version, 2);
}

#[tokio::test]
async fn a_healthy_master_is_left_in_place() {
    let dir = tempfile::tempdir().unwrap();
    let store = file_store(&dir);
    let master = byol("i-a", "10.0.0.1");
    let reporter = byol("i-b", "10.0.0.2");

    seed_done_master(&store, &master, 100_000).await;
    seed_health(&store, &master, true, 100_000).await;

    let result = resolve_election(&store, &reporter, 130_000, &settings()).await.unwrap();

    assert!(result.new_master_record.is_none());
    assert_eq!(result.master_ip(), Some("10.0.0.1"));
    assert_eq!(result.master_instance_id(), Some("i-a"));

    let stored = store.get_election_record("asg-1").await.unwrap().unwrap();
    assert_eq!(stored.version, 2);
}

#[tokio::test]
async fn a_byol_reporter_takes_over_from_an_unhealthy_master() {
    let dir = tempfile::tempdir().unwrap();
    let store = file_store(&dir);
    let master = byol("i-a", "10.0.0.1");
    let reporter = byol("i-b", "10.0.0.2");

    seed_done_master(&store, &master, 100_000).await;
    seed_health(&store, &master, false, 100_000).await;

    let result = resolve_election(&store, &reporter, 130_000, &settings()).await.unwrap();

    assert_eq!(result.master_ip(), Some("10.0.0.2"));
    let stored = store.get_election_record("asg-1").await.unwrap().unwrap();
    assert_eq!(stored.vote_state, VoteState::Done);
    assert_eq!(stored.instance_id, "i-b");
    assert_eq!(stored.version, 3);
}

#[tokio::test]
async fn a_payg_reporter_leaves_the_group_masterless() {
    let dir = tempfile::tempdir().unwrap();
    let store = file_store(&dir);
    let master = byol("i-a", "10.0.0.1");
    let reporter = payg("i-b", "10.0.0.2");

    seed_done_master(&store, &master, 100_000).await;
    seed_health(&store, &master, false, 100_000).await;

    let result = resolve_election(&store, &reporter, 130_000, &settings()).await.unwrap();

    assert!(result.new_master_record.is_none());
    assert_eq!(result.master_ip(), None);

    // nothing was written
    let stored = store.get_election_record("asg-1").await.unwrap().unwrap();
    assert_eq!(stored.instance_id, "i-a");
    assert_eq!(stored.version, 2);
}

#[tokio::test]
async fn an_unhealthy_master_cannot_reelect_itself() {
    let dir = tempfile::tempdir().unwrap();
    let store = file_store(&dir);
    let master = byol("i-a", "10.0.0.1");

    seed_done_master(&store, &master, 100_000).await;
    seed_health(&store, &master, false, 100_000).await;

    let result = resolve_election(&store, &master, 130_000, &settings()).await.unwrap();

    assert!(result.new_master_record.is_none());
    assert_eq!(result.master_ip(), None);
    let stored = store.get_election_record("asg-1").await.unwrap().unwrap();
    assert_eq!(stored.instance_id, "i-a");
    assert_eq!(stored.version, 2);
}

#[tokio::test]
async fn concurrent_first_heartbeats_elect_exactly_one_candidate() {
    let dir = tempfile::tempdir().unwrap();
    let store = file_store(&dir);
    let a = byol("i-a", "10.0.0.1");
    let b = byol("i-b", "10.0.0.2");
    let settings = settings();

    let (left, right) = join!(
        resolve_election(&store, &a, 1_000, &settings),
        resolve_election(&store, &b, 1_000, &settings),
    );
    let left = left.unwrap();
    let right = right.unwrap();

    assert!(left.new_master_record.is_none());
    assert!(right.new_master_record.is_none());

    let records = store.list_election_records().await.unwrap();
    assert_eq!(records.len(), 1);
    let stored = &records[0];
    assert_eq!(stored.version, 1);

    // the loser adopted the winner's candidate
    assert_eq!(left.candidate_id.as_deref(), Some(stored.instance_id.as_str()));
    assert_eq!(right.candidate_id.as_deref(), Some(stored.instance_id.as_str()));
}
