use crate::common::instance::Instance;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteState {
    Pending,
    Done,
}

/// One election record per scaling group. While `pending` the named
/// instance is only a candidate; it must not be reported as master.
/// The candidate's ip is stored alongside so the master can be reported
/// without a compute lookup.
///
/// `version` drives the conditional writes: the writer bumps it and the
/// store rejects the write unless the stored record still carries the
/// previous version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MasterElectionRecord {
    pub scaling_group_id: String,
    pub instance_id: String,
    pub ip: String,
    pub vote_state: VoteState,
    pub vote_start_time_ms: i64,
    pub vote_end_time_ms: i64,
    pub version: u64,
}

impl MasterElectionRecord {
    pub fn new_pending(instance: &Instance, now_ms: i64, election_timeout_ms: i64) -> Self {
        Self {
            scaling_group_id: instance.scaling_group_id.clone(),
            instance_id: instance.instance_id.clone(),
            ip: instance.primary_private_ip.clone(),
            vote_state: VoteState::Pending,
            vote_start_time_ms: now_ms,
            vote_end_time_ms: now_ms + election_timeout_ms,
            version: 1,
        }
    }

    pub fn new_done(instance: &Instance, now_ms: i64, election_timeout_ms: i64) -> Self {
        let mut record = Self::new_pending(instance, now_ms, election_timeout_ms);
        record.vote_state = VoteState::Done;
        record
    }

    pub fn is_done(&self) -> bool {
        self.vote_state == VoteState::Done
    }
}

/// Per-request outcome of the election evaluation. `new_master_record` is
/// set only when this request confirmed or replaced the master; records
/// carry the instance id and ip, so the master identity is always
/// recoverable from here without another store read.
#[derive(Debug, Clone)]
pub struct ElectionResult {
    /// Record as observed before this request's changes (or the record
    /// adopted after a lost creation race).
    pub old_master_record: Option<MasterElectionRecord>,
    /// Whether the recorded master was seen healthy during this request.
    pub old_master_healthy: bool,
    /// Candidate named by the record that was in play this request.
    pub candidate_id: Option<String>,
    /// Set only when an election concluded or a replacement occurred now.
    pub new_master_record: Option<MasterElectionRecord>,
}

impl ElectionResult {
    pub fn pending(record: MasterElectionRecord) -> Self {
        Self {
            candidate_id: Some(record.instance_id.clone()),
            old_master_record: Some(record),
            old_master_healthy: false,
            new_master_record: None,
        }
    }

    pub fn done(record: MasterElectionRecord, healthy: bool) -> Self {
        Self {
            candidate_id: Some(record.instance_id.clone()),
            old_master_record: Some(record),
            old_master_healthy: healthy,
            new_master_record: None,
        }
    }

    pub fn elected(previous: Option<MasterElectionRecord>, record: MasterElectionRecord) -> Self {
        Self {
            old_master_record: previous,
            old_master_healthy: false,
            candidate_id: Some(record.instance_id.clone()),
            new_master_record: Some(record),
        }
    }

    /// The ip to report back to heartbeating instances, when one may be
    /// reported at all: a just-confirmed master always is, an existing
    /// master only while its election is done and it was seen healthy.
    /// A pending candidate is never reported.
    pub fn master_ip(&self) -> Option<&str> {
        if let Some(record) = &self.new_master_record {
            return Some(record.ip.as_str());
        }
        match &self.old_master_record {
            Some(record) if record.is_done() && self.old_master_healthy => {
                Some(record.ip.as_str())
            }
            _ => None,
        }
    }

    /// Identity of the recorded master regardless of its health.
    pub fn master_instance_id(&self) -> Option<&str> {
        if let Some(record) = &self.new_master_record {
            return Some(record.instance_id.as_str());
        }
        self.old_master_record
            .as_ref()
            .filter(|record| record.is_done())
            .map(|record| record.instance_id.as_str())
    }
}
