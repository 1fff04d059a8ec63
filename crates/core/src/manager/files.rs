//! Waiting on files the game may still hold open.

use std::path::Path;
use tokio::fs::OpenOptions;
use tracing::{debug, warn};

use super::config::RetryPolicy;

/// Waits until `path` can be opened for writing.
///
/// Returns `false` once the policy is exhausted; the caller decides whether to
/// go ahead anyway.
pub async fn wait_for_file(path: &Path, policy: &RetryPolicy) -> bool {
    for attempt in 1..=policy.max_attempts {
        match OpenOptions::new().read(true).write(true).open(path).await {
            Ok(_) => {
                if attempt > 1 {
                    debug!(path = %path.display(), attempt, "File became available");
                }
                return true;
            }
            Err(e) => {
                debug!(path = %path.display(), attempt, "File not available yet: {}", e);
                if attempt < policy.max_attempts {
                    tokio::time::sleep(policy.delay()).await;
                }
            }
        }
    }
    warn!(
        path = %path.display(),
        "File still unavailable after {} attempts", policy.max_attempts
    );
    false
}

/// Copies `from` to `to`, retrying while the source is locked or missing.
///
/// The last error is returned once the policy is exhausted.
pub async fn copy_with_retry(
    from: &Path,
    to: &Path,
    policy: &RetryPolicy,
) -> Result<(), std::io::Error> {
    let mut attempt = 1;
    loop {
        match tokio::fs::copy(from, to).await {
            Ok(_) => return Ok(()),
            Err(e) if attempt < policy.max_attempts => {
                warn!(
                    from = %from.display(),
                    attempt,
                    "Copy failed, retrying: {}", e
                );
                attempt += 1;
                tokio::time::sleep(policy.delay()).await;
            }
            Err(e) => return Err(e),
        }
    }
}
