use serverless_autoscale_coordinator::common::config::CoordinatorSettings;
use serverless_autoscale_coordinator::common::health::{HealthCheckRecord, SyncState};
use serverless_autoscale_coordinator::common::instance::{Instance, LicenseType};
use serverless_autoscale_coordinator::handler::health_tracker::update_health_check_record;

fn settings() -> CoordinatorSettings {
    CoordinatorSettings {
        election_timeout_ms: 90_000,
        heartbeat_interval_ms: 30_000,
        heartbeat_delay_allowance_ms: 2_000,
        max_heartbeat_loss_count: 3,
    }
}

fn instance(id: &str) -> Instance {
    Instance {
        instance_id: id.to_string(),
        scaling_group_id: "asg-1".to_string(),
        primary_private_ip: "10.0.0.10".to_string(),
        license_type: LicenseType::Byol,
        launch_time_ms: None,
    }
}

#[test]
fn first_contact_creates_healthy_record() {
    let settings = settings();
    let record = update_health_check_record(None, &instance("i-1"), 1_000, None, &settings);

    assert_eq!(record.version, 1);
    assert!(record.healthy);
    assert_eq!(record.heartbeat_loss_count, 0);
    assert_eq!(record.sync_state, SyncState::InSync);
    assert_eq!(record.next_heartbeat_time_ms, 1_000 + 30_000);
    assert_eq!(record.max_heartbeat_loss_count, 3);
}

#[test]
fn first_contact_honors_requested_interval() {
    let settings = settings();
    let record = update_health_check_record(None, &instance("i-1"), 1_000, Some(10_000), &settings);

    assert_eq!(record.heartbeat_interval_ms, 10_000);
    assert_eq!(record.next_heartbeat_time_ms, 11_000);
}

#[test]
fn on_time_heartbeat_resets_loss_count() {
    let settings = settings();
    let mut previous = HealthCheckRecord::first_heartbeat(&instance("i-1"), 1_000, 30_000, 3);
    previous.heartbeat_loss_count = 2;

    // within the configured delay allowance still counts as on time
    let arrival = previous.next_heartbeat_time_ms + 1_500;
    let record =
        update_health_check_record(Some(&previous), &instance("i-1"), arrival, None, &settings);

    assert_eq!(record.heartbeat_loss_count, 0);
    assert!(record.healthy);
    assert_eq!(record.sync_state, SyncState::InSync);
    assert_eq!(record.next_heartbeat_time_ms, previous.next_heartbeat_time_ms + 30_000);
    assert_eq!(record.version, previous.version + 1);
}

#[test]
fn late_heartbeat_increments_loss_count_but_stays_healthy() {
    let settings = settings();
    let previous = HealthCheckRecord::first_heartbeat(&instance("i-1"), 1_000, 30_000, 3);

    let arrival = previous.next_heartbeat_time_ms + 30_000;
    let record =
        update_health_check_record(Some(&previous), &instance("i-1"), arrival, None, &settings);

    assert_eq!(record.heartbeat_loss_count, 1);
    assert!(record.healthy);
    assert_eq!(record.sync_state, SyncState::InSync);
    // the expected schedule slips one interval per arrival, late or not
    assert_eq!(record.next_heartbeat_time_ms, previous.next_heartbeat_time_ms + 30_000);
}

#[test]
fn loss_count_reaching_ceiling_flips_record_out_of_sync() {
    let settings = settings();
    let mut previous = HealthCheckRecord::first_heartbeat(&instance("i-1"), 1_000, 30_000, 3);
    previous.heartbeat_loss_count = 2;

    let arrival = previous.next_heartbeat_time_ms + 90_000;
    let record =
        update_health_check_record(Some(&previous), &instance("i-1"), arrival, None, &settings);

    assert_eq!(record.heartbeat_loss_count, 3);
    assert!(!record.healthy);
    assert_eq!(record.sync_state, SyncState::OutOfSync);
}

#[test]
fn out_of_sync_record_stays_failed_even_when_on_time() {
    let settings = settings();
    let mut previous = HealthCheckRecord::first_heartbeat(&instance("i-1"), 1_000, 30_000, 3);
    previous.heartbeat_loss_count = 3;
    previous.healthy = false;
    previous.sync_state = SyncState::OutOfSync;

    let arrival = previous.next_heartbeat_time_ms;
    let record =
        update_health_check_record(Some(&previous), &instance("i-1"), arrival, None, &settings);

    assert!(!record.healthy);
    assert_eq!(record.sync_state, SyncState::OutOfSync);
    assert_eq!(record.heartbeat_loss_count, 3);
}

#[test]
fn heartbeat_records_follow_ip_changes() {
    let settings = settings();
    let previous = HealthCheckRecord::first_heartbeat(&instance("i-1"), 1_000, 30_000, 3);

    let mut moved = instance("i-1");
    moved.primary_private_ip = "10.0.9.9".to_string();
    let record = update_health_check_record(
        Some(&previous),
        &moved,
        previous.next_heartbeat_time_ms,
        None,
        &settings,
    );

    assert_eq!(record.ip, "10.0.9.9");
}
