pub mod health_checks;
pub mod heartbeat;
pub mod masters;
