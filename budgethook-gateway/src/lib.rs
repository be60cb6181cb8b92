pub mod config;
pub mod mock;
pub mod server;
pub mod submitter;
