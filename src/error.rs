use thiserror::Error;

use crate::admin::AdminError;

#[derive(Error, Debug)]
pub enum RsInitError {
    #[error("Connection error: {0}")]
    Connect(AdminError),

    #[error("Error checking replica set status: {0}")]
    StatusCheck(AdminError),

    #[error("Error initiating replica set: {0}")]
    Initiate(AdminError),

    #[error("Replica set did not reach PRIMARY after {attempts} status polls")]
    NotReady { attempts: u32 },

    #[error("Wait for replica set cancelled")]
    Cancelled,

    #[error("Invalid replica set config: {0}")]
    InvalidConfig(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, RsInitError>;
