use std::path::Path;
use std::time::Instant;

use anyhow::Context;
use chrono::Utc;
use gce_client::{BootDisk, NewInstance};
use vmlift_core::config::LaunchConfig;
use vmlift_core::names;
use vmlift_core::report::{self, CloneTiming};

pub fn run(cfg: &LaunchConfig, report_path: &Path) -> anyhow::Result<()> {
    super::check_config(cfg)?;
    let client = super::build_client(cfg)?;

    println!("project: {}  zone: {}", client.project(), cfg.zone);

    // 1) snapshot the base instance's boot disk
    let base = client
        .instance_get(&cfg.zone, &cfg.instance)?
        .with_context(|| {
            format!(
                "base instance '{}' not found; run `vmlift launch` first",
                cfg.instance
            )
        })?;
    let disk = base
        .boot_disk_name()
        .context("base instance has no boot disk")?;

    let snapshot = names::snapshot_name(&cfg.instance);
    if client.snapshot_get(&snapshot)?.is_some() {
        println!("  exists:  snapshot {snapshot}");
    } else {
        println!("  creating snapshot {snapshot} from disk {disk} ...");
        client
            .create_disk_snapshot(&cfg.zone, disk, &snapshot)
            .with_context(|| format!("failed to snapshot disk '{disk}'"))?;
        println!("  created: snapshot {snapshot}");
    }

    // 2) clones, timed one by one
    let snapshot_url = names::snapshot_url(client.project(), &snapshot);
    let mut timings = Vec::new();
    for i in 1..=cfg.clone_count {
        let name = names::clone_name(&cfg.instance, i);
        if client.instance_get(&cfg.zone, &name)?.is_some() {
            println!("  exists:  instance {name}");
            timings.push(CloneTiming {
                instance: name,
                seconds: 0.0,
            });
            continue;
        }

        let spec = NewInstance {
            name: name.clone(),
            machine_type: names::machine_type_url(&cfg.zone, &cfg.machine_type),
            boot_disk: BootDisk::Snapshot(snapshot_url.clone()),
            network: names::network_url(client.project()),
            tags: vec![cfg.firewall_name()],
            metadata: vec![],
            service_accounts: vec![],
        };
        let started = Instant::now();
        client
            .create_instance(&cfg.zone, &spec)
            .with_context(|| format!("failed to create clone '{name}'"))?;
        let seconds = started.elapsed().as_secs_f64();
        println!("  created: instance {name} in {seconds:.2}s");
        timings.push(CloneTiming {
            instance: name,
            seconds,
        });
    }

    // 3) timing report
    report::write_timing_report(
        report_path,
        &cfg.instance,
        &cfg.zone,
        &cfg.machine_type,
        Utc::now(),
        &timings,
    )
    .with_context(|| format!("failed to write {}", report_path.display()))?;
    println!("  wrote: {}", report_path.display());
    Ok(())
}
