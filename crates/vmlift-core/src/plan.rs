use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Fixed artifacts
// ---------------------------------------------------------------------------

/// Default directory the demo application is installed into.
pub const DEFAULT_INSTALL_DIR: &str = "/opt/vmlift";

/// Filename of the generated application.
pub const APP_FILENAME: &str = "app.py";

/// The generated application: one route answering GET / with a fixed body.
/// Written verbatim, never templated. Replace with your real application
/// install if required.
pub const APP_SOURCE: &str = r#"from flask import Flask

app = Flask(__name__)


@app.route("/")
def index():
    return "Hello from a vmlift-provisioned machine!\n"
"#;

// ---------------------------------------------------------------------------
// Step / Plan
// ---------------------------------------------------------------------------

/// One shell command in the provisioning sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    /// Human label, used in progress output and failure messages.
    pub label: String,
    /// Command executed via `sh -c`.
    pub command: String,
}

impl Step {
    pub fn new(label: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            command: command.into(),
        }
    }
}

/// The fixed provisioning sequence: refresh the package index, install the
/// interpreter and its package manager, install the one library dependency,
/// write the application file, launch it in the foreground.
///
/// A `Plan` is inert data. [`crate::bootstrap`] executes it on the current
/// machine; [`crate::startup`] renders it into an instance startup script.
/// Given the same port and install dir, both renderings are byte-identical
/// between runs.
#[derive(Debug, Clone)]
pub struct Plan {
    port: u16,
    install_dir: PathBuf,
}

impl Plan {
    /// The standard sequence, installing into [`DEFAULT_INSTALL_DIR`].
    pub fn standard(port: u16) -> Self {
        Self {
            port,
            install_dir: PathBuf::from(DEFAULT_INSTALL_DIR),
        }
    }

    /// Override the install directory (used by tests and non-root runs).
    pub fn with_install_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.install_dir = dir.into();
        self
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn install_dir(&self) -> &Path {
        &self.install_dir
    }

    /// Absolute path of the generated application file.
    pub fn app_path(&self) -> PathBuf {
        self.install_dir.join(APP_FILENAME)
    }

    /// The setup steps, in order. Does not include writing the application
    /// file or launching it; each failure aborts the whole sequence.
    pub fn setup_steps(&self) -> Vec<Step> {
        vec![
            Step::new("refresh package index", "apt-get update"),
            Step::new(
                "install system packages",
                "apt-get install -y python3 python3-pip",
            ),
            Step::new("install flask", "pip3 install flask"),
        ]
    }

    /// The foreground launch command: binds all interfaces on the fixed port
    /// and blocks until externally terminated.
    pub fn launch_command(&self) -> String {
        format!(
            "cd {} && FLASK_APP=app flask run -h 0.0.0.0 -p {}",
            self.install_dir.display(),
            self.port
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_plan_uses_fixed_paths() {
        let plan = Plan::standard(5000);
        assert_eq!(plan.app_path(), PathBuf::from("/opt/vmlift/app.py"));
        assert_eq!(plan.port(), 5000);
    }

    #[test]
    fn setup_steps_are_ordered() {
        let steps = Plan::standard(5000).setup_steps();
        assert_eq!(steps.len(), 3);
        assert_eq!(steps[0].command, "apt-get update");
        assert!(steps[1].command.contains("python3-pip"));
        assert!(steps[2].command.contains("flask"));
    }

    #[test]
    fn setup_steps_are_stable_between_calls() {
        let plan = Plan::standard(5000);
        assert_eq!(plan.setup_steps(), plan.setup_steps());
    }

    #[test]
    fn launch_command_binds_all_interfaces_on_the_port() {
        let cmd = Plan::standard(5001).launch_command();
        assert!(cmd.contains("-h 0.0.0.0"));
        assert!(cmd.contains("-p 5001"));
    }

    #[test]
    fn app_source_has_one_route() {
        assert_eq!(APP_SOURCE.matches("@app.route").count(), 1);
        assert!(APP_SOURCE.contains(r#"@app.route("/")"#));
    }
}
