pub mod backlog;
pub mod budget;
pub mod configuration;
pub mod description;
pub mod error;

pub use configuration::*;
pub use error::*;
