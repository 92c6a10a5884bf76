//! Renders a [`Plan`] into instance startup scripts.
//!
//! The worker script is the provisioning sequence itself, rendered as bash
//! for the `startup-script` metadata key. The launcher script is used by
//! `chain`: it pulls its payloads from the metadata server and creates the
//! worker instance. Both renderings are pure functions of their inputs.

use crate::config::LaunchConfig;
use crate::plan::{Plan, APP_FILENAME, APP_SOURCE};

/// Metadata key carrying the worker's startup script on the launcher VM.
pub const WORKER_SCRIPT_ATTR: &str = "worker-startup-script";

/// Render the provisioning sequence as a boot-time startup script.
///
/// Mirrors `bootstrap::run_setup` + `bootstrap::launch` exactly, except the
/// launch is backgrounded with `nohup` so the boot sequence can complete.
/// Output goes to `/var/log/startup-script.log` and syslog.
pub fn worker_script(plan: &Plan) -> String {
    let mut script = String::new();
    script.push_str("#!/bin/bash\nset -euxo pipefail\n\n");
    script.push_str("LOG=/var/log/startup-script.log\n");
    script.push_str("exec > >(tee -a ${LOG} | logger -t startup-script) 2>&1\n\n");

    for step in plan.setup_steps() {
        script.push_str(&step.command);
        script.push('\n');
    }
    script.push('\n');

    let dir = plan.install_dir().display();
    script.push_str(&format!("mkdir -p {dir}\n"));
    script.push_str(&format!("cat > {dir}/{APP_FILENAME} <<'APPEOF'\n"));
    script.push_str(APP_SOURCE);
    script.push_str("APPEOF\n\n");

    script.push_str(&format!("cd {dir}\n"));
    script.push_str("export FLASK_APP=app\n");
    script.push_str(&format!(
        "nohup flask run -h 0.0.0.0 -p {} &\n",
        plan.port()
    ));
    script
}

/// Render the launcher VM's startup script.
///
/// The launcher fetches the worker's startup script and parameters from its
/// own instance metadata, ensures the worker's firewall rule exists, and
/// creates the worker with `gcloud` (preinstalled on Google-provided
/// images). The launcher's service account needs the compute scope; `chain`
/// attaches it.
pub fn launcher_script(cfg: &LaunchConfig) -> String {
    format!(
        r#"#!/bin/bash
set -euxo pipefail

LOG=/var/log/startup-script.log
exec > >(tee -a ${{LOG}} | logger -t startup-script) 2>&1

mkdir -p /srv/vmlift
cd /srv/vmlift

attr() {{
  curl -fsS "http://metadata.google.internal/computeMetadata/v1/instance/attributes/$1" \
    -H "Metadata-Flavor: Google"
}}

attr {WORKER_SCRIPT_ATTR} > worker-startup.sh
PROJECT="$(attr project)"
WORKER_NAME="$(attr worker-name)"
WORKER_ZONE="$(attr worker-zone)"
WORKER_PORT="$(attr worker-port)"

FIREWALL="allow-${{WORKER_PORT}}"
gcloud compute firewall-rules describe "${{FIREWALL}}" --project "${{PROJECT}}" >/dev/null 2>&1 || \
  gcloud compute firewall-rules create "${{FIREWALL}}" \
    --project "${{PROJECT}}" --direction INGRESS --action ALLOW \
    --rules "tcp:${{WORKER_PORT}}" --source-ranges 0.0.0.0/0 \
    --target-tags "${{FIREWALL}}"

gcloud compute instances create "${{WORKER_NAME}}" \
  --project "${{PROJECT}}" --zone "${{WORKER_ZONE}}" \
  --machine-type {machine_type} \
  --image-family {image_family} --image-project {image_project} \
  --tags "${{FIREWALL}}" \
  --metadata-from-file startup-script=worker-startup.sh
"#,
        machine_type = cfg.machine_type,
        image_family = cfg.image_family,
        image_project = cfg.image_project,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn worker_script_is_deterministic() {
        let plan = Plan::standard(5000);
        assert_eq!(worker_script(&plan), worker_script(&plan));
    }

    #[test]
    fn worker_script_runs_the_full_sequence() {
        let script = worker_script(&Plan::standard(5000));
        let update = script.find("apt-get update").unwrap();
        let install = script.find("apt-get install -y python3 python3-pip").unwrap();
        let flask = script.find("pip3 install flask").unwrap();
        let write = script.find("cat > /opt/vmlift/app.py").unwrap();
        let launch = script.find("nohup flask run -h 0.0.0.0 -p 5000 &").unwrap();
        assert!(update < install && install < flask && flask < write && write < launch);
    }

    #[test]
    fn worker_script_fails_fast() {
        let script = worker_script(&Plan::standard(5000));
        assert!(script.starts_with("#!/bin/bash\nset -euxo pipefail\n"));
    }

    #[test]
    fn worker_script_embeds_the_app_verbatim() {
        let script = worker_script(&Plan::standard(5000));
        assert!(script.contains(APP_SOURCE));
        // The heredoc is quoted so the payload is never expanded.
        assert!(script.contains("<<'APPEOF'"));
    }

    #[test]
    fn worker_script_respects_port_and_dir() {
        let plan = Plan::standard(5001).with_install_dir("/opt/demo");
        let script = worker_script(&plan);
        assert!(script.contains("cat > /opt/demo/app.py"));
        assert!(script.contains("-p 5001"));
    }

    #[test]
    fn launcher_script_pulls_payloads_from_metadata() {
        let script = launcher_script(&LaunchConfig::default());
        assert!(script.contains("Metadata-Flavor: Google"));
        assert!(script.contains(WORKER_SCRIPT_ATTR));
        assert!(script.contains("gcloud compute instances create"));
        assert!(script.contains("--image-family ubuntu-2204-lts"));
        assert!(script.contains("--metadata-from-file startup-script=worker-startup.sh"));
    }

    #[test]
    fn launcher_script_ensures_the_worker_firewall() {
        let script = launcher_script(&LaunchConfig::default());
        let describe = script.find("firewall-rules describe").unwrap();
        let create = script.find("firewall-rules create").unwrap();
        assert!(describe < create);
    }
}
