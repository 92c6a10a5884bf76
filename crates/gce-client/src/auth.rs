//! Access-token acquisition for the Compute API.
//!
//! Three sources, tried in order by [`TokenSource::detect`]:
//! 1. the `GOOGLE_OAUTH_ACCESS_TOKEN` environment variable
//! 2. the GCE metadata server (when running on a VM)
//! 3. the `gcloud` CLI (workstation with user credentials)

use std::process::Command;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{GceError, Result};

/// Environment variable consulted first, matching the gcloud convention.
pub const TOKEN_ENV: &str = "GOOGLE_OAUTH_ACCESS_TOKEN";

/// Environment variable naming the project, consulted before any probing.
pub const PROJECT_ENV: &str = "GOOGLE_CLOUD_PROJECT";

const METADATA_BASE: &str = "http://metadata.google.internal";
const METADATA_FLAVOR: (&str, &str) = ("Metadata-Flavor", "Google");
const PROBE_TIMEOUT: Duration = Duration::from_millis(500);

// ─── TokenSource ──────────────────────────────────────────────────────────

/// Where bearer tokens come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenSource {
    /// A fixed token, e.g. from the environment or a test.
    Static(String),
    /// The instance metadata server's default service account.
    Metadata,
    /// `gcloud auth print-access-token`.
    Gcloud,
}

impl TokenSource {
    /// Pick the first source that is available in this environment.
    pub fn detect() -> Result<Self> {
        if let Ok(token) = std::env::var(TOKEN_ENV) {
            if !token.trim().is_empty() {
                return Ok(TokenSource::Static(token.trim().to_string()));
            }
        }
        if metadata_server_reachable(METADATA_BASE) {
            return Ok(TokenSource::Metadata);
        }
        if which::which("gcloud").is_ok() {
            return Ok(TokenSource::Gcloud);
        }
        Err(GceError::Auth(format!(
            "set {TOKEN_ENV}, run on a GCE instance, or install the gcloud CLI"
        )))
    }

    /// Fetch a bearer token from this source.
    pub fn token(&self, http: &reqwest::blocking::Client) -> Result<String> {
        match self {
            TokenSource::Static(token) => Ok(token.clone()),
            TokenSource::Metadata => fetch_metadata_token(http, METADATA_BASE),
            TokenSource::Gcloud => gcloud_stdout(&["auth", "print-access-token"]),
        }
    }
}

/// Resolve the active project: environment, then metadata server, then the
/// gcloud configuration.
pub fn detect_project() -> Result<String> {
    if let Ok(project) = std::env::var(PROJECT_ENV) {
        if !project.trim().is_empty() {
            return Ok(project.trim().to_string());
        }
    }
    if metadata_server_reachable(METADATA_BASE) {
        let http = reqwest::blocking::Client::new();
        return fetch_metadata_project(&http, METADATA_BASE);
    }
    if which::which("gcloud").is_ok() {
        let project = gcloud_stdout(&["config", "get-value", "project"])?;
        if !project.is_empty() && project != "(unset)" {
            return Ok(project);
        }
    }
    Err(GceError::Auth(format!(
        "no project configured: set {PROJECT_ENV} or `gcloud config set project`"
    )))
}

// ─── Metadata server ──────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct MetadataToken {
    access_token: String,
}

fn metadata_server_reachable(base: &str) -> bool {
    let Ok(http) = reqwest::blocking::Client::builder()
        .timeout(PROBE_TIMEOUT)
        .build()
    else {
        return false;
    };
    http.get(format!("{base}/computeMetadata/v1/instance/"))
        .header(METADATA_FLAVOR.0, METADATA_FLAVOR.1)
        .send()
        .map(|r| r.status().is_success())
        .unwrap_or(false)
}

fn fetch_metadata_token(http: &reqwest::blocking::Client, base: &str) -> Result<String> {
    let resp = http
        .get(format!(
            "{base}/computeMetadata/v1/instance/service-accounts/default/token"
        ))
        .header(METADATA_FLAVOR.0, METADATA_FLAVOR.1)
        .send()?;
    if !resp.status().is_success() {
        return Err(GceError::Auth(format!(
            "metadata server returned {}",
            resp.status()
        )));
    }
    let token: MetadataToken = resp.json()?;
    Ok(token.access_token)
}

fn fetch_metadata_project(http: &reqwest::blocking::Client, base: &str) -> Result<String> {
    let resp = http
        .get(format!("{base}/computeMetadata/v1/project/project-id"))
        .header(METADATA_FLAVOR.0, METADATA_FLAVOR.1)
        .send()?;
    if !resp.status().is_success() {
        return Err(GceError::Auth(format!(
            "metadata server returned {}",
            resp.status()
        )));
    }
    Ok(resp.text()?.trim().to_string())
}

// ─── gcloud CLI ───────────────────────────────────────────────────────────

fn gcloud_stdout(args: &[&str]) -> Result<String> {
    let output = Command::new("gcloud")
        .args(args)
        .output()
        .map_err(|e| GceError::Auth(format!("failed to run gcloud: {e}")))?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let hint = stderr.lines().next().unwrap_or("").to_string();
        return Err(GceError::Auth(format!(
            "gcloud {} failed: {hint}",
            args.join(" ")
        )));
    }
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

// ─── Tests ────────────────────────────────────────────────────────────────
