pub mod bootstrap;
pub mod chain;
pub mod clone;
pub mod launch;
pub mod script;

use anyhow::{bail, Context};
use gce_client::auth::{self, TokenSource};
use gce_client::Client;
use vmlift_core::config::{LaunchConfig, WarnLevel};

/// Surface config warnings; fail on error-level findings before any API call.
pub(crate) fn check_config(cfg: &LaunchConfig) -> anyhow::Result<()> {
    let mut fatal = false;
    for w in cfg.validate() {
        match w.level {
            WarnLevel::Warning => tracing::warn!("{}", w.message),
            WarnLevel::Error => {
                tracing::error!("{}", w.message);
                fatal = true;
            }
        }
    }
    if fatal {
        bail!("configuration is invalid");
    }
    Ok(())
}

/// Resolve credentials and project, and build the Compute client.
pub(crate) fn build_client(cfg: &LaunchConfig) -> anyhow::Result<Client> {
    let token_source = TokenSource::detect().context("no Google Cloud credentials found")?;
    let project = match &cfg.project {
        Some(p) => p.clone(),
        None => auth::detect_project().context("could not determine the project")?,
    };
    Ok(Client::new(project, token_source))
}
