use serde::Deserialize;
use serde_json::json;

use crate::client::Client;
use crate::error::Result;
use crate::operations::Operation;

// ─── Instance (read side) ─────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Instance {
    pub name: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub disks: Vec<AttachedDisk>,
    #[serde(default)]
    pub network_interfaces: Vec<NetworkInterface>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachedDisk {
    #[serde(default)]
    pub boot: bool,
    #[serde(default)]
    pub source: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkInterface {
    #[serde(default)]
    pub access_configs: Vec<AccessConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AccessConfig {
    #[serde(rename = "natIP", default)]
    pub nat_ip: Option<String>,
}

impl Instance {
    /// The external (NAT) IP, once one has been assigned.
    pub fn external_ip(&self) -> Option<&str> {
        self.network_interfaces
            .first()?
            .access_configs
            .first()?
            .nat_ip
            .as_deref()
    }

    /// Name of the boot disk, parsed from its source URL.
    pub fn boot_disk_name(&self) -> Option<&str> {
        let disk = self.disks.iter().find(|d| d.boot)?;
        disk.source.rsplit('/').next()
    }
}

// ─── NewInstance (write side) ─────────────────────────────────────────────

/// How the boot disk is initialized.
#[derive(Debug, Clone)]
pub enum BootDisk {
    /// `sourceImage`: a full image self-link.
    Image(String),
    /// `sourceSnapshot`: a full snapshot URL.
    Snapshot(String),
}

#[derive(Debug, Clone)]
pub struct MetadataItem {
    pub key: String,
    pub value: String,
}

impl MetadataItem {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServiceAccount {
    pub email: String,
    pub scopes: Vec<String>,
}

impl ServiceAccount {
    /// The instance's default service account with the compute scope —
    /// enough to create further instances from inside the VM.
    pub fn default_compute() -> Self {
        Self {
            email: "default".to_string(),
            scopes: vec!["https://www.googleapis.com/auth/compute".to_string()],
        }
    }
}

/// Everything needed to insert an instance. The boot disk auto-deletes with
/// the instance; networking is one NIC on the project's default network
/// with one-to-one NAT, matching what the console creates by default.
#[derive(Debug, Clone)]
pub struct NewInstance {
    pub name: String,
    /// Partial machine-type URL (`zones/<z>/machineTypes/<mt>`).
    pub machine_type: String,
    pub boot_disk: BootDisk,
    /// Full network URL.
    pub network: String,
    pub tags: Vec<String>,
    pub metadata: Vec<MetadataItem>,
    pub service_accounts: Vec<ServiceAccount>,
}

impl NewInstance {
    pub(crate) fn to_body(&self) -> serde_json::Value {
        let init = match &self.boot_disk {
            BootDisk::Image(image) => json!({ "sourceImage": image }),
            BootDisk::Snapshot(snapshot) => json!({ "sourceSnapshot": snapshot }),
        };
        let mut body = json!({
            "name": self.name,
            "machineType": self.machine_type,
            "disks": [{
                "boot": true,
                "autoDelete": true,
                "initializeParams": init,
            }],
            "networkInterfaces": [{
                "network": self.network,
                "accessConfigs": [{ "name": "External NAT", "type": "ONE_TO_ONE_NAT" }],
            }],
        });
        if !self.tags.is_empty() {
            body["tags"] = json!({ "items": self.tags });
        }
        if !self.metadata.is_empty() {
            let items: Vec<_> = self
                .metadata
                .iter()
                .map(|m| json!({ "key": m.key, "value": m.value }))
                .collect();
            body["metadata"] = json!({ "items": items });
        }
        if !self.service_accounts.is_empty() {
            let accounts: Vec<_> = self
                .service_accounts
                .iter()
                .map(|sa| json!({ "email": sa.email, "scopes": sa.scopes }))
                .collect();
            body["serviceAccounts"] = json!(accounts);
        }
        body
    }
}

// ─── Client methods ───────────────────────────────────────────────────────

impl Client {
    /// `Ok(None)` when the instance does not exist.
    pub fn instance_get(&self, zone: &str, name: &str) -> Result<Option<Instance>> {
        self.get_opt(&format!(
            "projects/{}/zones/{zone}/instances/{name}",
            self.project()
        ))
    }

    /// Insert an instance and wait for the zone operation to complete.
    pub fn create_instance(&self, zone: &str, spec: &NewInstance) -> Result<()> {
        let op: Operation = self.post(
            &format!("projects/{}/zones/{zone}/instances", self.project()),
            &spec.to_body(),
        )?;
        self.wait_zone_operation(zone, &op.name)
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::TokenSource;
    use std::time::Duration;

    fn fast_client(server: &mockito::Server) -> Client {
        Client::new("p", TokenSource::Static("tok".to_string()))
            .with_base_url(server.url())
            .with_poll_interval(Duration::from_millis(1))
    }

    fn sample_instance() -> Instance {
        serde_json::from_str(
            r#"{
                "name": "flask-vm",
                "status": "RUNNING",
                "disks": [
                    {"boot": false, "source": "https://.../disks/scratch"},
                    {"boot": true, "source": "https://.../zones/us-west1-b/disks/flask-vm"}
                ],
                "networkInterfaces": [
                    {"accessConfigs": [{"natIP": "34.1.2.3"}]}
                ]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn external_ip_reads_first_nat_ip() {
        assert_eq!(sample_instance().external_ip(), Some("34.1.2.3"));
    }

    #[test]
    fn external_ip_none_before_assignment() {
        let inst: Instance =
            serde_json::from_str(r#"{"name":"x","networkInterfaces":[{"accessConfigs":[{}]}]}"#)
                .unwrap();
        assert_eq!(inst.external_ip(), None);
    }

    #[test]
    fn boot_disk_name_picks_the_boot_disk() {
        assert_eq!(sample_instance().boot_disk_name(), Some("flask-vm"));
    }

    #[test]
    fn boot_disk_name_none_without_boot_disk() {
        let inst: Instance = serde_json::from_str(r#"{"name":"x","disks":[]}"#).unwrap();
        assert_eq!(inst.boot_disk_name(), None);
    }

    #[test]
    fn new_instance_body_from_image() {
        let spec = NewInstance {
            name: "flask-vm".to_string(),
            machine_type: "zones/us-west1-b/machineTypes/e2-medium".to_string(),
            boot_disk: BootDisk::Image("https://.../images/ubuntu-2204".to_string()),
            network: "projects/p/global/networks/default".to_string(),
            tags: vec!["allow-5000".to_string()],
            metadata: vec![MetadataItem::new("startup-script", "#!/bin/bash\n")],
            service_accounts: vec![],
        };
        let body = spec.to_body();
        assert_eq!(body["name"], "flask-vm");
        assert_eq!(body["disks"][0]["boot"], true);
        assert_eq!(body["disks"][0]["autoDelete"], true);
        assert_eq!(
            body["disks"][0]["initializeParams"]["sourceImage"],
            "https://.../images/ubuntu-2204"
        );
        assert_eq!(body["tags"]["items"][0], "allow-5000");
        assert_eq!(body["metadata"]["items"][0]["key"], "startup-script");
        assert_eq!(
            body["networkInterfaces"][0]["accessConfigs"][0]["type"],
            "ONE_TO_ONE_NAT"
        );
        assert!(body.get("serviceAccounts").is_none());
    }

    #[test]
    fn new_instance_body_from_snapshot_with_service_account() {
        let spec = NewInstance {
            name: "clone-1".to_string(),
            machine_type: "zones/z/machineTypes/e2-medium".to_string(),
            boot_disk: BootDisk::Snapshot("projects/p/global/snapshots/snap".to_string()),
            network: "projects/p/global/networks/default".to_string(),
            tags: vec![],
            metadata: vec![],
            service_accounts: vec![ServiceAccount::default_compute()],
        };
        let body = spec.to_body();
        assert_eq!(
            body["disks"][0]["initializeParams"]["sourceSnapshot"],
            "projects/p/global/snapshots/snap"
        );
        assert!(body.get("tags").is_none());
        assert!(body.get("metadata").is_none());
        assert_eq!(body["serviceAccounts"][0]["email"], "default");
    }

    #[test]
    fn instance_get_missing_is_none() {
        let mut server = mockito::Server::new();
        let _mock = server
            .mock("GET", "/projects/p/zones/z/instances/nope")
            .with_status(404)
            .create();

        let got = fast_client(&server).instance_get("z", "nope").unwrap();
        assert!(got.is_none());
    }

    #[test]
    fn create_instance_inserts_then_waits() {
        let mut server = mockito::Server::new();
        let insert = server
            .mock("POST", "/projects/p/zones/z/instances")
            .with_status(200)
            .with_body(r#"{"name":"op-9","status":"RUNNING"}"#)
            .create();
        let poll = server
            .mock("GET", "/projects/p/zones/z/operations/op-9")
            .with_status(200)
            .with_body(r#"{"name":"op-9","status":"DONE"}"#)
            .create();

        let spec = NewInstance {
            name: "flask-vm".to_string(),
            machine_type: "zones/z/machineTypes/e2-medium".to_string(),
            boot_disk: BootDisk::Image("img".to_string()),
            network: "net".to_string(),
            tags: vec![],
            metadata: vec![],
            service_accounts: vec![],
        };
        fast_client(&server).create_instance("z", &spec).unwrap();
        insert.assert();
        poll.assert();
    }
}
