//! Long-running operation polling.
//!
//! Every mutating Compute call returns an `Operation`; callers poll it until
//! `status == "DONE"`, then check its `error` block. Poll cadence and the
//! overall deadline come from the [`Client`] settings.

use std::time::Instant;

use serde::Deserialize;

use crate::client::Client;
use crate::error::{GceError, Result};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    pub name: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub error: Option<OperationError>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OperationError {
    #[serde(default)]
    pub errors: Vec<OperationErrorDetail>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OperationErrorDetail {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
}

impl Operation {
    pub fn is_done(&self) -> bool {
        self.status == "DONE"
    }

    /// Flatten the error block into one message, if any.
    fn error_message(&self) -> Option<String> {
        let err = self.error.as_ref()?;
        let joined = err
            .errors
            .iter()
            .map(|d| {
                if d.code.is_empty() {
                    d.message.clone()
                } else {
                    format!("{}: {}", d.code, d.message)
                }
            })
            .collect::<Vec<_>>()
            .join("; ");
        Some(if joined.is_empty() {
            "unspecified operation error".to_string()
        } else {
            joined
        })
    }
}

impl Client {
    /// Poll a zone operation until it completes.
    pub fn wait_zone_operation(&self, zone: &str, name: &str) -> Result<()> {
        let path = format!(
            "projects/{}/zones/{zone}/operations/{name}",
            self.project()
        );
        self.wait_operation(&path, name)
    }

    /// Poll a global operation until it completes.
    pub fn wait_global_operation(&self, name: &str) -> Result<()> {
        let path = format!("projects/{}/global/operations/{name}", self.project());
        self.wait_operation(&path, name)
    }

    fn wait_operation(&self, path: &str, name: &str) -> Result<()> {
        let deadline = Instant::now() + self.operation_timeout();
        loop {
            let op: Operation = self.get(path)?;
            if op.is_done() {
                if let Some(message) = op.error_message() {
                    return Err(GceError::OperationFailed {
                        name: name.to_string(),
                        message,
                    });
                }
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(GceError::OperationTimeout(name.to_string()));
            }
            std::thread::sleep(self.poll_interval());
        }
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────
