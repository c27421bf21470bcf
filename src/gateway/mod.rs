pub mod gateway_impl;
pub mod log_gateway;
pub mod memory_gateway;
