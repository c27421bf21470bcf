use std::sync::Arc;

use crate::common::config::CoordinatorSettings;
use crate::gateway::gateway_impl::ScalingGroupGatewayImpl;
use crate::storage::record_store_impl::RecordStoreImpl;

#[derive(Clone)]
pub struct HandlerContext {
    pub record_store: Arc<RecordStoreImpl>,
    pub scaling_group: Arc<ScalingGroupGatewayImpl>,
    pub settings: Arc<CoordinatorSettings>,
}
