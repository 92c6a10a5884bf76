use clap::ValueEnum;
use vmlift_core::config::LaunchConfig;
use vmlift_core::plan::Plan;
use vmlift_core::startup;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Role {
    /// The provisioning sequence, as run on a launched instance at boot.
    Worker,
    /// The script a `chain` launcher runs to create the worker.
    Launcher,
}

/// Print a rendered startup script to stdout.
pub fn run(cfg: &LaunchConfig, role: Role) -> anyhow::Result<()> {
    let text = match role {
        Role::Worker => {
            let plan = Plan::standard(cfg.port).with_install_dir(&cfg.install_dir);
            startup::worker_script(&plan)
        }
        Role::Launcher => startup::launcher_script(cfg),
    };
    print!("{text}");
    Ok(())
}
