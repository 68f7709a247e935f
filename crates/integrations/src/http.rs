use std::time::Duration;

use reqwest::{Client, Response};
use slashgate_core::config::HttpConfig;
use slashgate_core::{Collaborator, IntegrationError};

const MAX_ERROR_DETAIL_CHARS: usize = 300;

/// Shared outbound client. Its timeout bounds every collaborator call so a
/// handler can still answer inside the platform's response window.
pub fn build_client(config: &HttpConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .timeout(Duration::from_millis(config.timeout_ms))
        .user_agent(config.user_agent.clone())
        .build()
}

pub(crate) fn transport_error(service: Collaborator, error: reqwest::Error) -> IntegrationError {
    if error.is_timeout() {
        IntegrationError::Timeout { service }
    } else {
        IntegrationError::Transport { service, message: error.to_string() }
    }
}

pub(crate) async fn ensure_success(
    service: Collaborator,
    response: Response,
) -> Result<Response, IntegrationError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let detail = response.text().await.unwrap_or_default();
    Err(IntegrationError::Status {
        service,
        status: status.as_u16(),
        detail: detail.chars().take(MAX_ERROR_DETAIL_CHARS).collect(),
    })
}

pub(crate) fn join_url(base_url: &str, path: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), path.trim_start_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::join_url;

    #[test]
    fn join_url_normalizes_slashes() {
        assert_eq!(join_url("https://a.test/", "/v1/pages"), "https://a.test/v1/pages");
        assert_eq!(join_url("https://a.test", "v1/pages"), "https://a.test/v1/pages");
    }
}
