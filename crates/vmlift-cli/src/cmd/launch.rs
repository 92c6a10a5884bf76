use std::time::Duration;

use anyhow::{bail, Context};
use gce_client::{BootDisk, Client, MetadataItem, NewInstance};
use vmlift_core::config::LaunchConfig;
use vmlift_core::plan::Plan;
use vmlift_core::{names, startup};

/// How long we poll for the instance's external IP after creation.
const IP_POLL_ATTEMPTS: u32 = 80;
const IP_POLL_INTERVAL: Duration = Duration::from_secs(2);

pub fn run(cfg: &LaunchConfig) -> anyhow::Result<()> {
    super::check_config(cfg)?;
    let client = super::build_client(cfg)?;

    println!("project: {}  zone: {}", client.project(), cfg.zone);

    // 1) firewall
    let firewall = cfg.firewall_name();
    let created = client
        .ensure_allow_tcp(&firewall, cfg.port)
        .with_context(|| format!("failed to ensure firewall '{firewall}'"))?;
    if created {
        println!("  created: firewall {firewall}");
    } else {
        println!("  exists:  firewall {firewall}");
    }

    // 2) instance
    if client.instance_get(&cfg.zone, &cfg.instance)?.is_none() {
        let image = client
            .image_from_family(&cfg.image_project, &cfg.image_family)
            .with_context(|| format!("failed to resolve image family '{}'", cfg.image_family))?;

        let plan = Plan::standard(cfg.port).with_install_dir(&cfg.install_dir);
        let spec = NewInstance {
            name: cfg.instance.clone(),
            machine_type: names::machine_type_url(&cfg.zone, &cfg.machine_type),
            boot_disk: BootDisk::Image(image.self_link),
            network: names::network_url(client.project()),
            tags: vec![firewall.clone()],
            metadata: vec![MetadataItem::new(
                "startup-script",
                startup::worker_script(&plan),
            )],
            service_accounts: vec![],
        };
        client
            .create_instance(&cfg.zone, &spec)
            .with_context(|| format!("failed to create instance '{}'", cfg.instance))?;
        println!("  created: instance {} ({})", cfg.instance, cfg.machine_type);
    } else {
        println!("  exists:  instance {}", cfg.instance);
    }

    // 3) external IP
    let ip = wait_external_ip(&client, cfg)?;
    println!("\nvisit: http://{ip}:{}", cfg.port);
    Ok(())
}

fn wait_external_ip(client: &Client, cfg: &LaunchConfig) -> anyhow::Result<String> {
    println!("waiting for an external IP ...");
    for _ in 0..IP_POLL_ATTEMPTS {
        if let Some(inst) = client.instance_get(&cfg.zone, &cfg.instance)? {
            if let Some(ip) = inst.external_ip() {
                return Ok(ip.to_string());
            }
        }
        std::thread::sleep(IP_POLL_INTERVAL);
    }
    bail!("timed out waiting for an external IP on '{}'", cfg.instance)
}
