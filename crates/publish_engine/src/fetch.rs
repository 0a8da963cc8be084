use std::time::Duration;

use url::Url;

use crate::{FailureKind, StatusFetchError};

#[derive(Debug, Clone)]
pub struct ClientSettings {
    /// Backend root, e.g. `http://localhost:8000`.
    pub base_url: String,
    /// Sent as `Authorization: Bearer <token>` when present.
    pub bearer_token: Option<String>,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            bearer_token: None,
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
        }
    }
}

#[async_trait::async_trait]
pub trait StatusFetcher: Send + Sync {
    /// Fetches the raw JSON status of one job.
    async fn fetch_status(&self, job_id: &str) -> Result<serde_json::Value, StatusFetchError>;
}

/// Builds `{base_url}/posts/status/{job_id}`, percent-encoding the id.
pub fn status_url(base_url: &str, job_id: &str) -> Result<Url, StatusFetchError> {
    let mut url = Url::parse(base_url)
        .map_err(|err| StatusFetchError::new(FailureKind::InvalidUrl, err.to_string()))?;
    {
        let mut segments = url.path_segments_mut().map_err(|()| {
            StatusFetchError::new(FailureKind::InvalidUrl, "base url cannot carry a path")
        })?;
        segments.pop_if_empty().extend(["posts", "status", job_id]);
    }
    Ok(url)
}

#[derive(Debug, Clone)]
pub struct ReqwestStatusFetcher {
    settings: ClientSettings,
    client: reqwest::Client,
}

impl ReqwestStatusFetcher {
    pub fn new(settings: ClientSettings) -> Result<Self, StatusFetchError> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| StatusFetchError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self { settings, client })
    }
}

#[async_trait::async_trait]
impl StatusFetcher for ReqwestStatusFetcher {
    async fn fetch_status(&self, job_id: &str) -> Result<serde_json::Value, StatusFetchError> {
        let url = status_url(&self.settings.base_url, job_id)?;

        let mut request = self.client.get(url);
        if let Some(token) = self.settings.bearer_token.as_deref() {
            request = request.bearer_auth(token);
        }
        let response = request.send().await.map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(StatusFetchError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        let body = response.bytes().await.map_err(map_reqwest_error)?;
        serde_json::from_slice(&body)
            .map_err(|err| StatusFetchError::new(FailureKind::Decode, err.to_string()))
    }
}

fn map_reqwest_error(err: reqwest::Error) -> StatusFetchError {
    if err.is_timeout() {
        return StatusFetchError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_decode() {
        return StatusFetchError::new(FailureKind::Decode, err.to_string());
    }
    StatusFetchError::new(FailureKind::Network, err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_url_appends_to_base_path() {
        let url = status_url("http://localhost:8000", "abc").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/posts/status/abc");

        let url = status_url("https://api.example.com/v1/", "abc").unwrap();
        assert_eq!(url.as_str(), "https://api.example.com/v1/posts/status/abc");
    }

    #[test]
    fn status_url_encodes_the_job_id() {
        let url = status_url("http://localhost:8000", "a/b c").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/posts/status/a%2Fb%20c");
    }

    #[test]
    fn status_url_rejects_bad_base() {
        let err = status_url("not a url", "abc").unwrap_err();
        assert_eq!(err.kind, FailureKind::InvalidUrl);
        let err = status_url("mailto:ops@example.com", "abc").unwrap_err();
        assert_eq!(err.kind, FailureKind::InvalidUrl);
    }
}
