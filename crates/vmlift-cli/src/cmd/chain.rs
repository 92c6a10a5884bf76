use anyhow::Context;
use gce_client::{BootDisk, MetadataItem, NewInstance, ServiceAccount};
use vmlift_core::config::LaunchConfig;
use vmlift_core::plan::Plan;
use vmlift_core::{names, startup};

/// Create the launcher VM. Its startup script pulls the worker's startup
/// script and parameters back out of instance metadata and creates the
/// worker, so the second hop happens entirely on the launcher.
pub fn run(cfg: &LaunchConfig) -> anyhow::Result<()> {
    super::check_config(cfg)?;
    let client = super::build_client(cfg)?;

    println!("project: {}  zone: {}", client.project(), cfg.zone);

    if client.instance_get(&cfg.zone, &cfg.launcher)?.is_some() {
        println!("  exists:  launcher {}", cfg.launcher);
        return Ok(());
    }

    let image = client
        .image_from_family(&cfg.image_project, &cfg.image_family)
        .with_context(|| format!("failed to resolve image family '{}'", cfg.image_family))?;

    let plan = Plan::standard(cfg.worker_port).with_install_dir(&cfg.install_dir);
    let spec = NewInstance {
        name: cfg.launcher.clone(),
        machine_type: names::machine_type_url(&cfg.zone, &cfg.machine_type),
        boot_disk: BootDisk::Image(image.self_link),
        network: names::network_url(client.project()),
        tags: vec![],
        metadata: vec![
            MetadataItem::new("startup-script", startup::launcher_script(cfg)),
            MetadataItem::new(startup::WORKER_SCRIPT_ATTR, startup::worker_script(&plan)),
            MetadataItem::new("project", client.project()),
            MetadataItem::new("worker-name", cfg.worker.clone()),
            MetadataItem::new("worker-zone", cfg.zone.clone()),
            MetadataItem::new("worker-port", cfg.worker_port.to_string()),
        ],
        // The launcher creates the worker itself, so it needs the compute
        // scope on its service account.
        service_accounts: vec![ServiceAccount::default_compute()],
    };
    client
        .create_instance(&cfg.zone, &spec)
        .with_context(|| format!("failed to create launcher '{}'", cfg.launcher))?;
    println!("  created: launcher {}", cfg.launcher);

    println!(
        "\nthe launcher will now create '{}' from its startup script.",
        cfg.worker
    );
    println!(
        "expect it within a minute or two, serving on port {}.",
        cfg.worker_port
    );
    Ok(())
}
