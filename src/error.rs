use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("File '{}' was not found", .0.display())]
    NotFound(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Capture decoding error: {0}")]
    Capture(#[from] pcap_file::PcapError),

    #[error("Address decoding error: {0}")]
    Decode(String),

    #[error("Unsupported capture link type: {0}")]
    UnsupportedLinkType(String),

    #[error("Configuration error: {0}")]
    Config(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to retrieve public ip information: unexpected status {0}")]
    UnexpectedResponse(u16),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Task error: {0}")]
    Task(String),
}

pub type Result<T> = std::result::Result<T, TrackerError>;
