use anyhow::Result;

use crate::common::config::CoordinatorSettings;
use crate::common::election::{ElectionResult, MasterElectionRecord, VoteState};
use crate::common::error::RecordStoreError;
use crate::common::instance::Instance;
use crate::storage::record_store_impl::RecordStoreImpl;
use crate::traits::record_store::RecordStore;

/// Evaluates the master election for the reporting instance's scaling
/// group. Every write is conditional; a lost race is settled by
/// re-reading the record that won and adopting it, never by retrying
/// the write.
pub async fn resolve_election(
    record_store: &RecordStoreImpl,
    instance: &Instance,
    now_ms: i64,
    settings: &CoordinatorSettings,
) -> Result<ElectionResult> {
    match record_store.get_election_record(&instance.scaling_group_id).await? {
        None => {
            let candidate =
                MasterElectionRecord::new_pending(instance, now_ms, settings.election_timeout_ms);
            match record_store.create_election_record(&candidate).await {
                Ok(()) => {
                    log::info!(
                        "Opened master election for {} with candidate {}",
                        instance.scaling_group_id,
                        instance.instance_id
                    );
                    Ok(ElectionResult::pending(candidate))
                }
                Err(RecordStoreError::Conflict { .. }) => {
                    log::debug!(
                        "Lost the election create race for {}, adopting the stored record",
                        instance.scaling_group_id
                    );
                    let winner = reread(record_store, &instance.scaling_group_id).await?;
                    resolve_existing(record_store, winner, instance, now_ms, settings).await
                }
                Err(e) => Err(e.into()),
            }
        }
        Some(record) => resolve_existing(record_store, record, instance, now_ms, settings).await,
    }
}

async fn resolve_existing(
    record_store: &RecordStoreImpl,
    record: MasterElectionRecord,
    instance: &Instance,
    now_ms: i64,
    settings: &CoordinatorSettings,
) -> Result<ElectionResult> {
    if !record.is_done() {
        let is_candidate = record.instance_id == instance.instance_id;
        if !is_candidate && now_ms < record.vote_end_time_ms {
            return Ok(ElectionResult::pending(record));
        }
        // The candidate's own heartbeat confirms the vote right away;
        // anyone else only takes the master role once the deadline has
        // passed, not necessarily the recorded candidate.
        let mut confirmed = record.clone();
        confirmed.instance_id = instance.instance_id.clone();
        confirmed.ip = instance.primary_private_ip.clone();
        confirmed.vote_state = VoteState::Done;
        confirmed.version = record.version + 1;
        return match record_store.update_election_record(&confirmed).await {
            Ok(()) => {
                log::info!(
                    "Master election for {} concluded, master is {}",
                    instance.scaling_group_id,
                    instance.instance_id
                );
                Ok(ElectionResult::elected(Some(record), confirmed))
            }
            Err(RecordStoreError::Conflict { .. }) => {
                log::debug!(
                    "Lost the election confirm race for {}, adopting the stored record",
                    instance.scaling_group_id
                );
                let winner = reread(record_store, &instance.scaling_group_id).await?;
                observe(record_store, winner).await
            }
            Err(e) => Err(e.into()),
        };
    }
    resolve_done(record_store, record, instance, now_ms, settings).await
}

/// Election already concluded. Checks the recorded master's health and,
/// when the policy allows it, lets the reporting instance take over.
async fn resolve_done(
    record_store: &RecordStoreImpl,
    record: MasterElectionRecord,
    instance: &Instance,
    now_ms: i64,
    settings: &CoordinatorSettings,
) -> Result<ElectionResult> {
    let master_health = record_store.get_health_check_record(&record.instance_id).await?;
    let master_healthy = master_health.map(|health| health.healthy).unwrap_or(false);
    if master_healthy {
        return Ok(ElectionResult::done(record, true));
    }

    let is_self = record.instance_id == instance.instance_id;
    if instance.license_type.can_initiate_failover() && !is_self {
        let mut replacement =
            MasterElectionRecord::new_done(instance, now_ms, settings.election_timeout_ms);
        replacement.version = record.version + 1;
        return match record_store.update_election_record(&replacement).await {
            Ok(()) => {
                log::info!(
                    "Unhealthy master {} in {} replaced by {}",
                    record.instance_id,
                    instance.scaling_group_id,
                    instance.instance_id
                );
                Ok(ElectionResult::elected(Some(record), replacement))
            }
            Err(RecordStoreError::Conflict { .. }) => {
                log::debug!(
                    "Lost the master replacement race for {}, adopting the stored record",
                    instance.scaling_group_id
                );
                let winner = reread(record_store, &instance.scaling_group_id).await?;
                observe(record_store, winner).await
            }
            Err(e) => Err(e.into()),
        };
    }

    if !is_self {
        log::info!(
            "Master {} in {} is unhealthy but {} may not take over, group stays masterless",
            record.instance_id,
            instance.scaling_group_id,
            instance.instance_id
        );
    }
    Ok(ElectionResult::done(record, false))
}

/// Read-only view of a record another instance just won. No writes
/// happen on this path, the caller already lost its race.
async fn observe(
    record_store: &RecordStoreImpl,
    record: MasterElectionRecord,
) -> Result<ElectionResult> {
    if !record.is_done() {
        return Ok(ElectionResult::pending(record));
    }
    let healthy = record_store
        .get_health_check_record(&record.instance_id)
        .await?
        .map(|health| health.healthy)
        .unwrap_or(false);
    Ok(ElectionResult::done(record, healthy))
}

async fn reread(
    record_store: &RecordStoreImpl,
    scaling_group_id: &str,
) -> Result<MasterElectionRecord> {
    record_store
        .get_election_record(scaling_group_id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("election record for {} vanished after a lost race", scaling_group_id))
}
