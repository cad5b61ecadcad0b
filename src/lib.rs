pub mod network;
pub mod output;
pub mod config;
pub mod error;
pub mod utils;

pub use error::{TrackerError, Result};
pub use config::Config;
