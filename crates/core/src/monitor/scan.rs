//! Directory enumeration.

use chrono::{DateTime, Utc};
use std::fs::Metadata;
use std::path::Path;
use walkdir::WalkDir;

use super::error::MonitorError;
use super::types::WatchChannel;
use crate::replay::ReplayIdentity;

/// Builds the identity of a file from its metadata.
///
/// Falls back to the modification time on filesystems that do not record
/// creation time.
pub fn identify(path: &Path) -> Result<ReplayIdentity, MonitorError> {
    let metadata = std::fs::metadata(path)?;
    Ok(ReplayIdentity::new(path, created_at(&metadata)))
}

fn created_at(metadata: &Metadata) -> DateTime<Utc> {
    metadata
        .created()
        .or_else(|_| metadata.modified())
        .map(DateTime::<Utc>::from)
        .unwrap_or_else(|_| Utc::now())
}

/// Recursively lists every file under `root` matching `channel`'s extension.
pub fn scan_directory(root: &Path, channel: WatchChannel) -> Result<Vec<ReplayIdentity>, MonitorError> {
    if !root.is_dir() {
        return Err(MonitorError::DirectoryNotFound {
            path: root.to_path_buf(),
        });
    }

    let mut found = Vec::new();
    for entry in WalkDir::new(root).follow_links(true) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::debug!("Skipping unreadable entry under {}: {}", root.display(), e);
                continue;
            }
        };
        if !entry.file_type().is_file() || !channel.matches(entry.path()) {
            continue;
        }
        match entry.metadata() {
            Ok(metadata) => found.push(ReplayIdentity::new(entry.path(), created_at(&metadata))),
            Err(e) => tracing::debug!("Skipping {}: {}", entry.path().display(), e),
        }
    }
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_scan_finds_nested_replays() {
        let dir = TempDir::new().unwrap();
        let account = dir.path().join("1234").join("2-Hero-1-5678").join("Replays").join("Multiplayer");
        fs::create_dir_all(&account).unwrap();
        fs::write(account.join("a.StormReplay"), b"a").unwrap();
        fs::write(account.join("b.StormReplay"), b"b").unwrap();
        fs::write(account.join("c.StormSave"), b"c").unwrap();
        fs::write(dir.path().join("notes.txt"), b"n").unwrap();

        let mut found = scan_directory(dir.path(), WatchChannel::Replay).unwrap();
        found.sort_by(|a, b| a.path.cmp(&b.path));
        assert_eq!(found.len(), 2);
        assert!(found[0].path.ends_with("a.StormReplay"));
        assert!(found[1].path.ends_with("b.StormReplay"));
    }

    #[test]
    fn test_scan_missing_directory() {
        let result = scan_directory(Path::new("/nonexistent/accounts"), WatchChannel::Replay);
        assert!(matches!(result, Err(MonitorError::DirectoryNotFound { .. })));
    }

    #[test]
    fn test_identify() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("x.StormReplay");
        fs::write(&path, b"x").unwrap();
        let identity = identify(&path).unwrap();
        assert_eq!(identity.path, path);
        assert!(identify(&dir.path().join("missing.StormReplay")).is_err());
    }
}
