pub mod record_store;
pub mod scaling_group;
