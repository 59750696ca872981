//! Shared HTTP client for the external services

use std::time::Duration;

use reqwest::Response;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};
use tracing::warn;

use super::{Result, SourceError};
use crate::config::SourcesConfig;

/// Build a client with a request timeout and retries for transient failures
pub fn build_client(config: &SourcesConfig) -> Result<ClientWithMiddleware> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_seconds))
        .user_agent(config.user_agent.clone())
        .build()
        .map_err(|e| SourceError::Network(format!("Failed to create HTTP client: {e}")))?;

    let retry_policy = ExponentialBackoff::builder().build_with_max_retries(config.max_retries);

    Ok(ClientBuilder::new(client)
        .with(RetryTransientMiddleware::new_with_policy(retry_policy))
        .build())
}

/// Turn a non-success status into an `Api` error, keeping the body for context
pub async fn check_status(response: Response, service: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    warn!("{} returned HTTP {}", service, status);

    Err(match status.as_u16() {
        401 | 403 => SourceError::PermissionDenied(format!("{service} rejected credentials")),
        code => SourceError::Api {
            status: code,
            message: format!("{service}: {}", body.chars().take(200).collect::<String>()),
        },
    })
}
