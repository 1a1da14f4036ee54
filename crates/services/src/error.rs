//! Shared error types for the services crate.

use thiserror::Error;

use tutor_core::CatalogError;

/// Faults raised by the evaluator and assistant gateways.
///
/// These never reach the lesson player: the services log them and hand the
/// player a degraded outcome instead.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GatewayError {
    #[error("AI gateway is not configured")]
    NotConfigured,
    #[error("AI gateway returned an empty response")]
    EmptyResponse,
    #[error("AI gateway request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("AI gateway returned a malformed payload: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Errors raised while reading gateway configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("no API key configured (set {0})")]
    MissingApiKey(&'static str),
    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),
}

/// Errors emitted while bootstrapping tutor services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}
