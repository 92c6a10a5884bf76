use std::time::Duration;

use serde::de::DeserializeOwned;

use crate::auth::TokenSource;
use crate::error::{GceError, Result};

const COMPUTE_BASE: &str = "https://compute.googleapis.com/compute/v1";

/// How often operations are re-polled, and for how long, by default.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1500);
pub const DEFAULT_OPERATION_TIMEOUT: Duration = Duration::from_secs(300);

// ─── Client ───────────────────────────────────────────────────────────────

/// Blocking Compute API client scoped to one project.
///
/// Resource methods live in the sibling modules (`instances`, `firewalls`,
/// `snapshots`, `images`, `operations`) as further `impl Client` blocks.
pub struct Client {
    http: reqwest::blocking::Client,
    token_source: TokenSource,
    base_url: String,
    project: String,
    poll_interval: Duration,
    operation_timeout: Duration,
}

impl Client {
    pub fn new(project: impl Into<String>, token_source: TokenSource) -> Self {
        Self {
            http: reqwest::blocking::Client::new(),
            token_source,
            base_url: COMPUTE_BASE.to_string(),
            project: project.into(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            operation_timeout: DEFAULT_OPERATION_TIMEOUT,
        }
    }

    /// Point the client at a different API root. Used by tests to target a
    /// local mock server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_operation_timeout(mut self, timeout: Duration) -> Self {
        self.operation_timeout = timeout;
        self
    }

    pub fn project(&self) -> &str {
        &self.project
    }

    pub(crate) fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    pub(crate) fn operation_timeout(&self) -> Duration {
        self.operation_timeout
    }

    // ─── Request helpers ──────────────────────────────────────────────────

    fn token(&self) -> Result<String> {
        self.token_source.token(&self.http)
    }

    /// GET a resource. `Ok(None)` on 404, so existence checks read naturally.
    pub(crate) fn get_opt<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>> {
        let url = format!("{}/{}", self.base_url, path);
        tracing::debug!(%url, "GET");
        let resp = self
            .http
            .get(&url)
            .bearer_auth(self.token()?)
            .send()?;

        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let resp = Self::check_status(resp)?;
        Ok(Some(resp.json()?))
    }

    /// GET a resource that must exist.
    pub(crate) fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.get_opt(path)?.ok_or_else(|| GceError::Api {
            status: 404,
            message: format!("not found: {path}"),
        })
    }

    /// POST a JSON body, returning the parsed response.
    pub(crate) fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<T> {
        let url = format!("{}/{}", self.base_url, path);
        tracing::debug!(%url, "POST");
        let resp = self
            .http
            .post(&url)
            .bearer_auth(self.token()?)
            .json(body)
            .send()?;
        let resp = Self::check_status(resp)?;
        Ok(resp.json()?)
    }

    /// Map non-2xx responses to [`GceError::Api`], pulling the message out
    /// of the API's error envelope when present.
    fn check_status(resp: reqwest::blocking::Response) -> Result<reqwest::blocking::Response> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let message = resp
            .text()
            .ok()
            .and_then(|body| serde_json::from_str::<serde_json::Value>(&body).ok())
            .and_then(|v| {
                v.pointer("/error/message")
                    .and_then(|m| m.as_str())
                    .map(str::to_owned)
            })
            .unwrap_or_else(|| status.to_string());
        Err(GceError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client(server: &mockito::Server) -> Client {
        Client::new("test-proj", TokenSource::Static("tok".to_string()))
            .with_base_url(server.url())
    }

    #[test]
    fn get_opt_maps_404_to_none() {
        let mut server = mockito::Server::new();
        let _mock = server
            .mock("GET", "/projects/test-proj/zones/z/instances/missing")
            .with_status(404)
            .create();

        let client = test_client(&server);
        let got: Option<serde_json::Value> = client
            .get_opt("projects/test-proj/zones/z/instances/missing")
            .unwrap();
        assert!(got.is_none());
    }

    #[test]
    fn get_opt_sends_bearer_token() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/projects/test-proj/thing")
            .match_header("authorization", "Bearer tok")
            .with_status(200)
            .with_body("{}")
            .create();

        let client = test_client(&server);
        let _: Option<serde_json::Value> = client.get_opt("projects/test-proj/thing").unwrap();
        mock.assert();
    }

    #[test]
    fn api_error_message_is_extracted() {
        let mut server = mockito::Server::new();
        let _mock = server
            .mock("GET", "/projects/test-proj/thing")
            .with_status(403)
            .with_body(r#"{"error":{"code":403,"message":"Required 'compute.instances.get' permission"}}"#)
            .create();

        let client = test_client(&server);
        let err = client
            .get_opt::<serde_json::Value>("projects/test-proj/thing")
            .unwrap_err();
        match err {
            GceError::Api { status, message } => {
                assert_eq!(status, 403);
                assert!(message.contains("compute.instances.get"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn api_error_without_envelope_falls_back_to_status() {
        let mut server = mockito::Server::new();
        let _mock = server
            .mock("GET", "/projects/test-proj/thing")
            .with_status(500)
            .with_body("oops")
            .create();

        let client = test_client(&server);
        let err = client
            .get_opt::<serde_json::Value>("projects/test-proj/thing")
            .unwrap_err();
        assert!(matches!(err, GceError::Api { status: 500, .. }));
    }
}
