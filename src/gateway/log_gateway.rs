use crate::common::error::GatewayError;
use crate::traits::scaling_group::UnsendScalingGroupGateway;

/// Records termination requests in the log only. Used when the
/// surrounding orchestration watches logs and performs the actual
/// scale-in itself.
pub struct LogScalingGroupGateway;

impl LogScalingGroupGateway {
    pub fn new() -> Self {
        LogScalingGroupGateway
    }
}

impl Default for LogScalingGroupGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl UnsendScalingGroupGateway for LogScalingGroupGateway {
    async fn delete_instance(&self, instance_id: &str) -> Result<(), GatewayError> {
        log::warn!("Scale-in requested for instance: {}", instance_id);
        Ok(())
    }
}
