use anyhow::{Context, Result};
use log::{debug, warn};
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use std::process::Command;

/// The payload StorCLI itself prints when no controller answers. Returned
/// when the binary is missing so the pipeline still produces a valid
/// (empty) scrape instead of erroring on hosts without a MegaRAID card.
const NO_CONTROLLER_REPORT: &str = r#"{"Controllers":[{"Command Status": {"Status": "Failure", "Description": "No Controller found"}}]}"#;

/// Run `storcli /call show all J` and return its raw stdout.
pub fn run_storcli(path: &Path) -> Result<Vec<u8>> {
    if !is_executable(path) {
        warn!(
            "{} is not an executable file, reporting no controllers",
            path.display()
        );
        return Ok(NO_CONTROLLER_REPORT.as_bytes().to_vec());
    }

    debug!("running {} /call show all J", path.display());
    let out = Command::new(path)
        .args(["/call", "show", "all", "J"])
        .output()
        .with_context(|| format!("failed to run {}", path.display()))?;

    // StorCLI encodes per-controller failures inside the JSON itself, so
    // the exit code is not checked here.
    Ok(out.stdout)
}

fn is_executable(path: &Path) -> bool {
    match std::fs::metadata(path) {
        Ok(m) => m.is_file() && m.permissions().mode() & 0o111 != 0,
        Err(_) => false,
    }
}
