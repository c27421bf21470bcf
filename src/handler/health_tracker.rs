use crate::common::config::CoordinatorSettings;
use crate::common::health::{HealthCheckRecord, SyncState};
use crate::common::instance::Instance;

/// Rolls an instance's health bookkeeping forward by one heartbeat.
///
/// The expected schedule slips forward by one interval per arrival
/// whether the heartbeat was on time or late, so a recovering instance
/// pays for every interval it slept through before the loss count can
/// reset. Once a record has gone out-of-sync it stays failed; only
/// deleting the record (which eviction does) starts a fresh episode.
pub fn update_health_check_record(
    previous: Option<&HealthCheckRecord>,
    instance: &Instance,
    arrival_ms: i64,
    requested_interval_ms: Option<i64>,
    settings: &CoordinatorSettings,
) -> HealthCheckRecord {
    let Some(previous) = previous else {
        let interval = requested_interval_ms.unwrap_or(settings.heartbeat_interval_ms);
        return HealthCheckRecord::first_heartbeat(
            instance,
            arrival_ms,
            interval,
            settings.max_heartbeat_loss_count,
        );
    };

    let mut record = previous.clone();
    record.version = previous.version + 1;
    record.ip = instance.primary_private_ip.clone();
    if let Some(interval) = requested_interval_ms {
        record.heartbeat_interval_ms = interval;
    }

    let on_time =
        arrival_ms <= previous.next_heartbeat_time_ms + settings.heartbeat_delay_allowance_ms;
    record.next_heartbeat_time_ms = previous.next_heartbeat_time_ms + record.heartbeat_interval_ms;

    if previous.is_out_of_sync() {
        if !on_time {
            record.heartbeat_loss_count = previous.heartbeat_loss_count.saturating_add(1);
        }
        record.healthy = false;
        record.sync_state = SyncState::OutOfSync;
        return record;
    }

    if on_time {
        record.heartbeat_loss_count = 0;
        record.healthy = true;
        record.sync_state = SyncState::InSync;
    } else {
        record.heartbeat_loss_count = previous.heartbeat_loss_count + 1;
        if record.heartbeat_loss_count >= record.max_heartbeat_loss_count {
            log::warn!(
                "Instance {} missed {} heartbeats, marking out-of-sync",
                record.instance_id,
                record.heartbeat_loss_count
            );
            record.healthy = false;
            record.sync_state = SyncState::OutOfSync;
        } else {
            record.healthy = true;
            record.sync_state = SyncState::InSync;
        }
    }
    record
}
