use serde::Deserialize;
use serde_json::json;

use crate::client::Client;
use crate::error::Result;
use crate::operations::Operation;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Firewall {
    pub name: String,
}

impl Client {
    /// `Ok(None)` when the rule does not exist.
    pub fn firewall_get(&self, name: &str) -> Result<Option<Firewall>> {
        self.get_opt(&format!(
            "projects/{}/global/firewalls/{name}",
            self.project()
        ))
    }

    /// Create-if-absent an INGRESS rule opening `tcp:<port>` from anywhere
    /// to instances tagged with the rule's own name. Returns `true` when
    /// the rule was created, `false` when it already existed.
    pub fn ensure_allow_tcp(&self, name: &str, port: u16) -> Result<bool> {
        if self.firewall_get(name)?.is_some() {
            return Ok(false);
        }

        let body = json!({
            "name": name,
            "network": format!("projects/{}/global/networks/default", self.project()),
            "direction": "INGRESS",
            "priority": 1000,
            "sourceRanges": ["0.0.0.0/0"],
            "targetTags": [name],
            "allowed": [{ "IPProtocol": "tcp", "ports": [port.to_string()] }],
        });

        let op: Operation = self.post(
            &format!("projects/{}/global/firewalls", self.project()),
            &body,
        )?;
        self.wait_global_operation(&op.name)?;
        Ok(true)
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────
