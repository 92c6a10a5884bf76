mod cmd;

use clap::{Parser, Subcommand};
use cmd::script::Role;
use std::path::PathBuf;
use vmlift_core::config::LaunchConfig;

#[derive(Parser)]
#[command(
    name = "vmlift",
    about = "One-shot VM provisioning — bootstrap this machine, or launch, clone, and chain cloud instances that bootstrap themselves",
    version,
    propagate_version = true
)]
struct Cli {
    /// Config file (default: ./vmlift.yaml when present)
    #[arg(long, global = true, env = "VMLIFT_CONFIG")]
    config: Option<PathBuf>,

    /// Google Cloud project (default: auto-detect)
    #[arg(long, global = true, env = "GOOGLE_CLOUD_PROJECT")]
    project: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Provision this machine: install packages, write the app, serve it in the foreground
    Bootstrap {
        /// Port the application listens on
        #[arg(long)]
        port: Option<u16>,
    },

    /// Print a rendered startup script
    Script {
        /// Which script to render
        #[arg(long, value_enum, default_value = "worker")]
        role: Role,
    },

    /// Ensure the firewall rule, create a provisioned instance, wait for its external IP
    Launch {
        #[arg(long)]
        zone: Option<String>,

        /// Instance name
        #[arg(long)]
        instance: Option<String>,

        #[arg(long)]
        machine_type: Option<String>,

        /// Port the application listens on
        #[arg(long)]
        port: Option<u16>,
    },

    /// Snapshot the base instance's boot disk and create clones booting from it
    Clone {
        #[arg(long)]
        zone: Option<String>,

        /// Base instance to snapshot
        #[arg(long)]
        base: Option<String>,

        /// Number of clones to create
        #[arg(long)]
        count: Option<u32>,

        /// Where the timing report is written
        #[arg(long, default_value = "TIMING.md")]
        report: PathBuf,
    },

    /// Create a launcher VM that creates the worker VM from its startup script
    Chain {
        #[arg(long)]
        zone: Option<String>,

        /// Launcher instance name
        #[arg(long)]
        launcher: Option<String>,

        /// Worker instance name
        #[arg(long)]
        worker: Option<String>,

        /// Port the chained worker serves on
        #[arg(long)]
        worker_port: Option<u16>,
    },
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_target(false)
        .init();

    if let Err(e) = run(cli) {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let cwd = std::env::current_dir()?;
    let mut cfg = LaunchConfig::load(cli.config.as_deref(), &cwd)?;
    if let Some(project) = cli.project {
        cfg.project = Some(project);
    }

    match cli.command {
        Commands::Bootstrap { port } => {
            if let Some(p) = port {
                cfg.port = p;
            }
            cmd::bootstrap::run(&cfg)
        }
        Commands::Script { role } => cmd::script::run(&cfg, role),
        Commands::Launch {
            zone,
            instance,
            machine_type,
            port,
        } => {
            if let Some(z) = zone {
                cfg.zone = z;
            }
            if let Some(i) = instance {
                cfg.instance = i;
            }
            if let Some(mt) = machine_type {
                cfg.machine_type = mt;
            }
            if let Some(p) = port {
                cfg.port = p;
            }
            cmd::launch::run(&cfg)
        }
        Commands::Clone {
            zone,
            base,
            count,
            report,
        } => {
            if let Some(z) = zone {
                cfg.zone = z;
            }
            if let Some(b) = base {
                cfg.instance = b;
            }
            if let Some(c) = count {
                cfg.clone_count = c;
            }
            cmd::clone::run(&cfg, &report)
        }
        Commands::Chain {
            zone,
            launcher,
            worker,
            worker_port,
        } => {
            if let Some(z) = zone {
                cfg.zone = z;
            }
            if let Some(l) = launcher {
                cfg.launcher = l;
            }
            if let Some(w) = worker {
                cfg.worker = w;
            }
            if let Some(p) = worker_port {
                cfg.worker_port = p;
            }
            cmd::chain::run(&cfg)
        }
    }
}
