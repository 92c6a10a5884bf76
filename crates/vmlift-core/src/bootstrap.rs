//! Executes a [`Plan`] on the current machine.
//!
//! Strictly sequential, fail-fast: the first failing step aborts the whole
//! sequence with no cleanup of already-applied steps. The application file
//! is written only after every setup step has succeeded, and the launch
//! replaces the current process, so the sequence never returns under normal
//! operation.

use std::path::PathBuf;
use std::process::{Command, Stdio};

use crate::error::{CoreError, Result};
use crate::io;
use crate::plan::{Plan, Step, APP_SOURCE};

/// Run all setup steps, then write the application file.
///
/// Steps run via `sh -c` with stdout/stderr inherited so package-manager
/// output lands in the invoking terminal. The file write is unconditional:
/// existing content at the target path is overwritten.
pub fn run_setup(plan: &Plan) -> Result<PathBuf> {
    run_steps(&plan.setup_steps())?;
    write_application(plan)
}

/// Run a sequence of steps in order, stopping at the first failure.
pub fn run_steps(steps: &[Step]) -> Result<()> {
    for step in steps {
        run_step(step)?;
    }
    Ok(())
}

fn run_step(step: &Step) -> Result<()> {
    println!("  step: {}", step.label);
    tracing::debug!(command = %step.command, "running step");

    let status = Command::new("sh")
        .arg("-c")
        .arg(&step.command)
        .stdin(Stdio::null())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()?;

    if status.success() {
        return Ok(());
    }
    match status.code() {
        Some(code) => Err(CoreError::StepFailed {
            label: step.label.clone(),
            code,
        }),
        None => Err(CoreError::StepKilled {
            label: step.label.clone(),
        }),
    }
}

/// Write the fixed application source to the plan's install dir.
/// Returns the path written.
pub fn write_application(plan: &Plan) -> Result<PathBuf> {
    let path = plan.app_path();
    io::atomic_write(&path, APP_SOURCE.as_bytes())?;
    println!("  wrote: {}", path.display());
    Ok(path)
}

/// Launch the application in the foreground.
///
/// On Unix this replaces the current process image, so on success this
/// function never returns; an `Err` means the exec itself failed (e.g.
/// `flask` is not on PATH). Bind failures (port already in use) surface
/// from the application process itself.
pub fn launch(plan: &Plan) -> Result<()> {
    let command = plan.launch_command();
    println!("  launch: {command}");

    let mut cmd = Command::new("sh");
    cmd.arg("-c").arg(&command);
    exec_foreground(cmd)
}

#[cfg(unix)]
fn exec_foreground(mut cmd: Command) -> Result<()> {
    use std::os::unix::process::CommandExt;
    // exec only returns on failure.
    Err(CoreError::Launch(cmd.exec()))
}

#[cfg(not(unix))]
fn exec_foreground(mut cmd: Command) -> Result<()> {
    let status = cmd.status().map_err(CoreError::Launch)?;
    if status.success() {
        Err(CoreError::AppExited)
    } else {
        Err(CoreError::StepFailed {
            label: "launch application".to_string(),
            code: status.code().unwrap_or(-1),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn run_steps_in_order() {
        let dir = TempDir::new().unwrap();
        let log = dir.path().join("order.log");
        let steps = vec![
            Step::new("first", format!("echo one >> {}", log.display())),
            Step::new("second", format!("echo two >> {}", log.display())),
        ];
        run_steps(&steps).unwrap();
        assert_eq!(std::fs::read_to_string(&log).unwrap(), "one\ntwo\n");
    }

    #[test]
    fn run_steps_stops_at_first_failure() {
        let dir = TempDir::new().unwrap();
        let log = dir.path().join("order.log");
        let steps = vec![
            Step::new("ok", format!("echo one >> {}", log.display())),
            Step::new("boom", "exit 7".to_string()),
            Step::new("never", format!("echo three >> {}", log.display())),
        ];
        let err = run_steps(&steps).unwrap_err();
        match err {
            CoreError::StepFailed { label, code } => {
                assert_eq!(label, "boom");
                assert_eq!(code, 7);
            }
            other => panic!("unexpected error: {other}"),
        }
        // The step after the failure must not have run.
        assert_eq!(std::fs::read_to_string(&log).unwrap(), "one\n");
    }

    #[test]
    fn write_application_is_idempotent_content() {
        let dir = TempDir::new().unwrap();
        let plan = Plan::standard(5000).with_install_dir(dir.path());
        let first = write_application(&plan).unwrap();
        let a = std::fs::read_to_string(&first).unwrap();
        let second = write_application(&plan).unwrap();
        let b = std::fs::read_to_string(&second).unwrap();
        assert_eq!(first, second);
        assert_eq!(a, b);
        assert_eq!(a, APP_SOURCE);
    }

    #[test]
    fn setup_failure_leaves_no_application_file() {
        let dir = TempDir::new().unwrap();
        let plan = Plan::standard(5000).with_install_dir(dir.path());
        // Simulate a failing install step before the write would happen.
        let err = run_steps(&[Step::new("install", "exit 1".to_string())]);
        assert!(err.is_err());
        assert!(!plan.app_path().exists());
    }
}
