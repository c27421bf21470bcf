use thiserror::Error;

/// Store failures, split by how the caller recovers: a `Conflict` is a
/// lost conditional write and is resolved by re-reading the winning
/// record, a `NotFound` only applies to deletes of absent records, and
/// everything else is a backend failure that fails the request.
#[derive(Debug, Error)]
pub enum RecordStoreError {
    #[error("conditional write lost for {key}")]
    Conflict { key: String },
    #[error("record not found: {key}")]
    NotFound { key: String },
    #[error("storage io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("record encoding error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error(transparent)]
    Service(#[from] anyhow::Error),
}

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("instance not found in scaling group: {instance_id}")]
    NotFound { instance_id: String },
    #[error(transparent)]
    Service(#[from] anyhow::Error),
}
