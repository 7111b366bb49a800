pub mod http;
#[cfg(test)]
pub mod scripted;

use std::{error::Error, future::Future};

use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

pub use http::{HttpService, InvalidBaseUrl};

#[derive(Debug, Error)]
pub enum ServiceError {
    /// The request went through, but the service did not answer with 200.
    #[error("service responded with status {0}")]
    Status(StatusCode),
    /// The request did not complete, or the response could not be decoded.
    #[error("request failed: {0}")]
    Transport(Box<dyn Error + Send + Sync>),
}

impl From<reqwest::Error> for ServiceError {
    fn from(value: reqwest::Error) -> Self {
        Self::Transport(Box::new(value))
    }
}

/// The remote key-value API the driver exercises.
pub trait KeyValueService {
    fn create(&self, key: &str, value: &str) -> impl Future<Output = Result<(), ServiceError>>;

    fn read(&self, key: &str) -> impl Future<Output = Result<Value, ServiceError>>;

    fn modify(&self, key: &str, value: &str) -> impl Future<Output = Result<(), ServiceError>>;

    fn delete(&self, key: &str) -> impl Future<Output = Result<(), ServiceError>>;

    fn list(&self) -> impl Future<Output = Result<Vec<String>, ServiceError>>;
}
