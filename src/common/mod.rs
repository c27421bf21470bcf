pub mod config;
pub mod election;
pub mod error;
pub mod health;
pub mod instance;
pub mod request;
pub mod utils;
