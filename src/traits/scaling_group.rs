use crate::common::error::GatewayError;

/// Narrow seam to the platform that owns the fleet. The coordinator only
/// ever needs one capability: removing an instance that failed its
/// heartbeat contract.
#[trait_variant::make(ScalingGroupGateway: Send)]
pub trait UnsendScalingGroupGateway {
    async fn delete_instance(&self, instance_id: &str) -> Result<(), GatewayError>;
}
