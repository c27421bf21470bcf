use std::sync::Arc;
use tokio::sync::Mutex;

use crate::common::error::GatewayError;
use crate::traits::scaling_group::UnsendScalingGroupGateway;

/// In-memory gateway. Remembers which instances were removed so tests
/// and local runs can inspect termination behavior.
#[derive(Clone, Default)]
pub struct MemoryScalingGroupGateway {
    deleted: Arc<Mutex<Vec<String>>>,
}

impl MemoryScalingGroupGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn deleted_instances(&self) -> Vec<String> {
        self.deleted.lock().await.clone()
    }
}

impl UnsendScalingGroupGateway for MemoryScalingGroupGateway {
    async fn delete_instance(&self, instance_id: &str) -> Result<(), GatewayError> {
        let mut deleted = self.deleted.lock().await;
        if deleted.iter().any(|id| id == instance_id) {
            return Err(GatewayError::NotFound { instance_id: instance_id.to_string() });
        }
        deleted.push(instance_id.to_string());
        log::info!("Removed instance from scaling group: {}", instance_id);
        Ok(())
    }
}
