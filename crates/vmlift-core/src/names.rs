use crate::error::{CoreError, Result};
use regex::Regex;
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// Resource-name validation
// ---------------------------------------------------------------------------

// Compute Engine resource names follow RFC 1035 labels.
static NAME_RE: OnceLock<Regex> = OnceLock::new();

fn name_re() -> &'static Regex {
    NAME_RE.get_or_init(|| Regex::new(r"^[a-z]([a-z0-9\-]*[a-z0-9])?$").unwrap())
}

pub fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() || name.len() > 63 || !name_re().is_match(name) {
        return Err(CoreError::InvalidName(name.to_string()));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Resource URL and name helpers
// ---------------------------------------------------------------------------

/// Partial machine-type URL, relative to a project (`zones/<z>/machineTypes/<mt>`).
pub fn machine_type_url(zone: &str, machine_type: &str) -> String {
    format!("zones/{zone}/machineTypes/{machine_type}")
}

/// The project's default network.
pub fn network_url(project: &str) -> String {
    format!("projects/{project}/global/networks/default")
}

/// Full snapshot URL used as a boot-disk source.
pub fn snapshot_url(project: &str, snapshot: &str) -> String {
    format!("projects/{project}/global/snapshots/{snapshot}")
}

/// Name of the snapshot taken from a base instance's boot disk.
pub fn snapshot_name(base_instance: &str) -> String {
    format!("base-snapshot-{base_instance}")
}

/// Name of the i-th clone of a base instance (1-based).
pub fn clone_name(base_instance: &str, index: u32) -> String {
    format!("{base_instance}-clone-{index}")
}

/// Firewall rule (and matching instance tag) that opens a TCP port.
pub fn firewall_name(port: u16) -> String {
    format!("allow-{port}")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
