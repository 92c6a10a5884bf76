use serde::Deserialize;
use serde_json::json;

use crate::client::Client;
use crate::error::Result;
use crate::operations::Operation;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub name: String,
    #[serde(default)]
    pub status: String,
}

impl Client {
    /// `Ok(None)` when the snapshot does not exist.
    pub fn snapshot_get(&self, name: &str) -> Result<Option<Snapshot>> {
        self.get_opt(&format!(
            "projects/{}/global/snapshots/{name}",
            self.project()
        ))
    }

    /// Snapshot a zonal disk and wait for the zone operation to complete.
    pub fn create_disk_snapshot(&self, zone: &str, disk: &str, snapshot: &str) -> Result<()> {
        let op: Operation = self.post(
            &format!(
                "projects/{}/zones/{zone}/disks/{disk}/createSnapshot",
                self.project()
            ),
            &json!({ "name": snapshot }),
        )?;
        self.wait_zone_operation(zone, &op.name)
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────
