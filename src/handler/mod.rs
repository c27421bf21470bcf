pub mod context;
pub mod health_tracker;
pub mod heartbeat_sync;
pub mod master_election;
