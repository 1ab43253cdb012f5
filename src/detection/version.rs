//! Best-effort `<binary> --version` probing.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, warn};

/// Run `<binary> --version` and return the first non-empty output line.
///
/// Returns `None` when the binary cannot be spawned, exits non-zero, prints
/// nothing, or does not finish within `timeout`. A timed-out child is killed.
pub async fn probe_version(binary: &Path, timeout: Duration) -> Option<String> {
    let mut command = Command::new(binary);
    command
        .arg("--version")
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let output = match tokio::time::timeout(timeout, command.output()).await {
        Ok(Ok(output)) => output,
        Ok(Err(e)) => {
            debug!("Failed to run {} --version: {}", binary.display(), e);
            return None;
        }
        Err(_) => {
            warn!("{} --version timed out after {:?}", binary.display(), timeout);
            return None;
        }
    };

    if !output.status.success() {
        debug!("{} --version exited with {}", binary.display(), output.status);
        return None;
    }

    first_line(&output.stdout).or_else(|| first_line(&output.stderr))
}

fn first_line(bytes: &[u8]) -> Option<String> {
    String::from_utf8_lossy(bytes)
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(ToString::to_string)
}
