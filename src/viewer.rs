//! Map artifacts on disk and the external viewer that opens them.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use sha2::{Digest, Sha256};

use crate::{MindmapError, Result};

pub const MAP_EXTENSION: &str = "mm";

/// Stable artifact location for a document identity (usually its path).
pub fn artifact_path(dir: &Path, identity: &str) -> PathBuf {
    let digest = Sha256::digest(identity.as_bytes());
    dir.join(format!("{}.{MAP_EXTENSION}", hex::encode(digest)))
}

/// Writes the map next to its final path first, then moves it into place.
pub fn write_map(path: &Path, xml: &str) -> Result<()> {
    let staging = path.with_extension(format!("{MAP_EXTENSION}.tmp"));
    fs::write(&staging, xml).map_err(|source| MindmapError::Write {
        path: staging.clone(),
        source,
    })?;
    if let Err(source) = fs::rename(&staging, path) {
        let _ = fs::remove_file(&staging);
        return Err(MindmapError::Write {
            path: path.to_path_buf(),
            source,
        });
    }
    tracing::info!(path = %path.display(), bytes = xml.len(), "map written");
    Ok(())
}

pub fn write_artifact(dir: &Path, identity: &str, xml: &str) -> Result<PathBuf> {
    fs::create_dir_all(dir).map_err(|source| MindmapError::Write {
        path: dir.to_path_buf(),
        source,
    })?;
    let path = artifact_path(dir, identity);
    write_map(&path, xml)?;
    Ok(path)
}

fn viewer_args(path: &Path) -> Vec<String> {
    let path = path.display().to_string();
    if cfg!(windows) {
        // The Windows launcher takes a window title before the file.
        vec![String::new(), path]
    } else {
        vec![path]
    }
}

/// Starts the viewer on `path` without waiting for it to exit.
pub fn launch_viewer(viewer: &str, path: &Path) -> Result<()> {
    Command::new(viewer)
        .args(viewer_args(path))
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|source| MindmapError::Launch {
            viewer: viewer.to_string(),
            source,
        })?;
    tracing::info!(viewer, path = %path.display(), "viewer launched");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_dir() -> PathBuf {
        let mut path = std::env::temp_dir();
        let stamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        path.push(format!("mindmark-viewer-{}-{}", std::process::id(), stamp));
        path
    }

    #[test]
    fn artifact_path_is_stable_per_identity() {
        let dir = Path::new("/tmp");
        let first = artifact_path(dir, "notes/plan.md");
        assert_eq!(first, artifact_path(dir, "notes/plan.md"));
        assert_ne!(first, artifact_path(dir, "notes/other.md"));
        let name = first.file_name().and_then(|name| name.to_str()).expect("name");
        assert_eq!(name.len(), 64 + 3);
        assert!(name.ends_with(".mm"));
    }

    #[test]
    fn write_artifact_leaves_no_staging_file() {
        let dir = temp_dir();
        let path = write_artifact(&dir, "doc.md", "<map></map>").expect("write");
        assert_eq!(fs::read_to_string(&path).expect("read"), "<map></map>");
        let entries = fs::read_dir(&dir).expect("list").count();
        assert_eq!(entries, 1);
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_viewer_is_a_launch_error() {
        let err = launch_viewer("mindmark-no-such-viewer", Path::new("x.mm"))
            .expect_err("expected error");
        assert!(matches!(err, MindmapError::Launch { .. }));
    }
}
