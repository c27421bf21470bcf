pub mod loader;
pub mod server;
