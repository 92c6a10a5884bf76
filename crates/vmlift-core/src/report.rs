use crate::error::Result;
use crate::io;
use chrono::{DateTime, Utc};
use std::path::Path;

/// One clone's creation time. Zero seconds means the instance already
/// existed and creation was skipped.
#[derive(Debug, Clone)]
pub struct CloneTiming {
    pub instance: String,
    pub seconds: f64,
}

/// Render the clone timing report as Markdown.
pub fn render_timing_report(
    base_instance: &str,
    zone: &str,
    machine_type: &str,
    measured_at: DateTime<Utc>,
    timings: &[CloneTiming],
) -> String {
    let mut out = String::new();
    out.push_str("# Clone Timing\n\n");
    out.push_str(&format!("- Base instance: `{base_instance}`\n"));
    out.push_str(&format!("- Zone: `{zone}`\n"));
    out.push_str(&format!("- Machine type: `{machine_type}`\n"));
    out.push_str(&format!(
        "- Measured: `{}`\n\n",
        measured_at.format("%Y-%m-%d %H:%M:%S")
    ));
    out.push_str("| Instance | Create time (s) |\n");
    out.push_str("|---|---:|\n");
    for t in timings {
        out.push_str(&format!("| `{}` | {:.2} |\n", t.instance, t.seconds));
    }
    out
}

/// Render and atomically write the report to `path`.
pub fn write_timing_report(
    path: &Path,
    base_instance: &str,
    zone: &str,
    machine_type: &str,
    measured_at: DateTime<Utc>,
    timings: &[CloneTiming],
) -> Result<()> {
    let rendered = render_timing_report(base_instance, zone, machine_type, measured_at, timings);
    io::atomic_write(path, rendered.as_bytes())
}
