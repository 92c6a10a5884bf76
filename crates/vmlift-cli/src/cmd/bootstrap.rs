use vmlift_core::bootstrap;
use vmlift_core::config::LaunchConfig;
use vmlift_core::plan::Plan;

/// Run the provisioning sequence on the current machine.
///
/// On success the final step replaces this process with the application,
/// so this only returns on failure.
pub fn run(cfg: &LaunchConfig) -> anyhow::Result<()> {
    let plan = Plan::standard(cfg.port).with_install_dir(&cfg.install_dir);

    println!("provisioning this machine (port {}):", plan.port());
    bootstrap::run_setup(&plan)?;
    bootstrap::launch(&plan)?;
    Ok(())
}
