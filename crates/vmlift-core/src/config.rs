use crate::error::{CoreError, Result};
use crate::names;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Config file looked up in the working directory when no explicit path is
/// given. All fields are optional there; the defaults below apply.
pub const CONFIG_FILE: &str = "vmlift.yaml";

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// LaunchConfig
// ---------------------------------------------------------------------------

/// Everything the cloud-side commands need. Defaults match the demo lab
/// setup: an e2-medium Ubuntu instance serving on port 5000.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LaunchConfig {
    /// Google Cloud project. Detected from the environment when unset.
    #[serde(default)]
    pub project: Option<String>,

    #[serde(default = "default_zone")]
    pub zone: String,

    /// The base instance created by `launch` and cloned by `clone`.
    #[serde(default = "default_instance")]
    pub instance: String,

    #[serde(default = "default_machine_type")]
    pub machine_type: String,

    /// Firewall rule name. Derived from the port when unset.
    #[serde(default)]
    pub firewall: Option<String>,

    /// Port the demo application listens on.
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_image_family")]
    pub image_family: String,

    #[serde(default = "default_image_project")]
    pub image_project: String,

    /// How many clones `clone` creates from the base snapshot.
    #[serde(default = "default_clone_count")]
    pub clone_count: u32,

    /// Where `bootstrap` installs the application on the target machine.
    #[serde(default = "default_install_dir")]
    pub install_dir: PathBuf,

    /// Launcher instance created by `chain`.
    #[serde(default = "default_launcher")]
    pub launcher: String,

    /// Worker instance the launcher creates in turn.
    #[serde(default = "default_worker")]
    pub worker: String,

    /// Port the chained worker serves on (distinct from the base instance
    /// so both can run in the same project).
    #[serde(default = "default_worker_port")]
    pub worker_port: u16,
}

fn default_zone() -> String {
    "us-west1-b".to_string()
}

fn default_instance() -> String {
    "flask-vm".to_string()
}

fn default_machine_type() -> String {
    "e2-medium".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_image_family() -> String {
    "ubuntu-2204-lts".to_string()
}

fn default_image_project() -> String {
    "ubuntu-os-cloud".to_string()
}

fn default_clone_count() -> u32 {
    3
}

fn default_install_dir() -> PathBuf {
    PathBuf::from(crate::plan::DEFAULT_INSTALL_DIR)
}

fn default_launcher() -> String {
    "vm1-launcher".to_string()
}

fn default_worker() -> String {
    "vm2-flask".to_string()
}

fn default_worker_port() -> u16 {
    5001
}

impl Default for LaunchConfig {
    fn default() -> Self {
        Self {
            project: None,
            zone: default_zone(),
            instance: default_instance(),
            machine_type: default_machine_type(),
            firewall: None,
            port: default_port(),
            image_family: default_image_family(),
            image_project: default_image_project(),
            clone_count: default_clone_count(),
            install_dir: default_install_dir(),
            launcher: default_launcher(),
            worker: default_worker(),
            worker_port: default_worker_port(),
        }
    }
}

impl LaunchConfig {
    /// Load from an explicit path (must exist), or from `vmlift.yaml` in
    /// `dir` when present, or fall back to defaults.
    pub fn load(explicit: Option<&Path>, dir: &Path) -> Result<Self> {
        let path = match explicit {
            Some(p) => {
                if !p.exists() {
                    return Err(CoreError::ConfigNotFound(p.display().to_string()));
                }
                p.to_path_buf()
            }
            None => {
                let p = dir.join(CONFIG_FILE);
                if !p.exists() {
                    return Ok(Self::default());
                }
                p
            }
        };
        let data = std::fs::read_to_string(&path)?;
        let cfg: LaunchConfig = serde_yaml::from_str(&data)?;
        Ok(cfg)
    }

    /// The firewall rule name, derived from the port unless overridden.
    pub fn firewall_name(&self) -> String {
        self.firewall
            .clone()
            .unwrap_or_else(|| names::firewall_name(self.port))
    }

    /// The firewall rule name for the chained worker.
    pub fn worker_firewall_name(&self) -> String {
        names::firewall_name(self.worker_port)
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        for name in [&self.instance, &self.launcher, &self.worker] {
            if names::validate_name(name).is_err() {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Error,
                    message: format!("invalid instance name '{name}'"),
                });
            }
        }

        if self.port < 1024 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: format!(
                    "port {} is privileged; the application runs as root on the VM but a local bootstrap may fail to bind",
                    self.port
                ),
            });
        }

        if let Some(fw) = &self.firewall {
            let derived = names::firewall_name(self.port);
            if *fw != derived {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Warning,
                    message: format!(
                        "firewall '{fw}' does not match the port-derived name '{derived}'; clones tag themselves with '{fw}'"
                    ),
                });
            }
        }

        if self.clone_count == 0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "clone_count is 0; `clone` will only snapshot".to_string(),
            });
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
