//! Shared plumbing for the remote weather and country APIs.

use std::time::Duration;

use anyhow::Context;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("not found")]
    NotFound,
    #[error("provider unavailable: {0}")]
    Unavailable(String),
}

pub fn http_client(timeout_secs: u64) -> anyhow::Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .user_agent(concat!("globoclima/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("Failed to build HTTP client")
}

/// Send `request` and decode a JSON body. Only 404 means `NotFound`.
pub async fn fetch_json<T: DeserializeOwned>(
    request: RequestBuilder,
    provider: &'static str,
) -> Result<T, ProviderError> {
    fetch_json_with(request, provider, &[StatusCode::NOT_FOUND]).await
}

/// Like `fetch_json`, with the provider's own set of "no such thing"
/// statuses. Transport failures, any other non-success status and undecodable
/// bodies map to `Unavailable`.
pub async fn fetch_json_with<T: DeserializeOwned>(
    request: RequestBuilder,
    provider: &'static str,
    not_found: &[StatusCode],
) -> Result<T, ProviderError> {
    let res = request.send().await.map_err(|e| {
        warn!(provider, error = %e, "upstream request failed");
        ProviderError::Unavailable(format!("{provider}: request failed"))
    })?;

    let status = res.status();
    let body = res.text().await.map_err(|e| {
        warn!(provider, error = %e, "failed to read upstream body");
        ProviderError::Unavailable(format!("{provider}: unreadable body"))
    })?;

    check_status(provider, status, &body, not_found)?;

    serde_json::from_str(&body).map_err(|e| {
        warn!(provider, error = %e, "failed to parse upstream JSON");
        ProviderError::Unavailable(format!("{provider}: malformed response"))
    })
}

fn check_status(
    provider: &'static str,
    status: StatusCode,
    body: &str,
    not_found: &[StatusCode],
) -> Result<(), ProviderError> {
    if not_found.contains(&status) {
        debug!(provider, %status, body = %truncate_body(body), "upstream has no match");
        return Err(ProviderError::NotFound);
    }
    if !status.is_success() {
        warn!(provider, %status, body = %truncate_body(body), "upstream error status");
        return Err(ProviderError::Unavailable(format!(
            "{provider}: status {status}"
        )));
    }
    Ok(())
}

pub fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((cut, _)) => format!("{}...", &body[..cut]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bad_request_is_an_outage_unless_the_provider_says_otherwise() {
        let default = [StatusCode::NOT_FOUND];
        assert!(matches!(
            check_status("restcountries", StatusCode::BAD_REQUEST, "", &default),
            Err(ProviderError::Unavailable(_))
        ));
        assert!(matches!(
            check_status("restcountries", StatusCode::NOT_FOUND, "", &default),
            Err(ProviderError::NotFound)
        ));

        let weatherapi = [StatusCode::NOT_FOUND, StatusCode::BAD_REQUEST];
        assert!(matches!(
            check_status("weatherapi", StatusCode::BAD_REQUEST, "", &weatherapi),
            Err(ProviderError::NotFound)
        ));
        assert!(check_status("weatherapi", StatusCode::OK, "{}", &weatherapi).is_ok());
        assert!(matches!(
            check_status("weatherapi", StatusCode::BAD_GATEWAY, "", &weatherapi),
            Err(ProviderError::Unavailable(_))
        ));
    }

    #[test]
    fn truncate_body_keeps_short_bodies() {
        assert_eq!(truncate_body("oops"), "oops");
    }

    #[test]
    fn truncate_body_cuts_on_char_boundary() {
        let long = "ã".repeat(300);
        let cut = truncate_body(&long);
        assert!(cut.ends_with("..."));
        assert_eq!(cut.chars().count(), 203);
    }
}
