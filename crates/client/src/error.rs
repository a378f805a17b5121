//! Client error types.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ClientError {
    #[error("invalid username: {0}")]
    InvalidUsername(String),
    #[error("invalid endpoint '{endpoint}': {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },
    #[error("invalid value for {key}: '{value}'")]
    InvalidConfig { key: &'static str, value: String },
}
