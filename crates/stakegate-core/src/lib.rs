pub mod config;
pub mod constants;
pub mod error;
pub mod types;

pub use config::{DelaySchedule, ElectionConfig};
pub use constants::*;
pub use error::StakeError;
pub use types::*;
