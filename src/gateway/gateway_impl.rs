use crate::common::error::GatewayError;
use crate::gateway::log_gateway::LogScalingGroupGateway;
use crate::gateway::memory_gateway::MemoryScalingGroupGateway;
use crate::traits::scaling_group::{ScalingGroupGateway, UnsendScalingGroupGateway};

pub enum ScalingGroupGatewayImpl {
    Log(LogScalingGroupGateway),
    Memory(MemoryScalingGroupGateway),
}

impl ScalingGroupGateway for ScalingGroupGatewayImpl {
    async fn delete_instance(&self, instance_id: &str) -> Result<(), GatewayError> {
        match self {
            ScalingGroupGatewayImpl::Log(g) => g.delete_instance(instance_id).await,
            ScalingGroupGatewayImpl::Memory(g) => g.delete_instance(instance_id).await,
        }
    }
}
