// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Credential persistence: tolerant load, atomic whole-file save.

use std::path::Path;

use crate::credential::StoreFile;
use crate::error::ConfigError;

/// Load the credential file.
///
/// A missing, unreadable, or corrupt file yields an empty store. Corruption
/// is logged but never surfaced; the caller sees "not authenticated" later.
pub fn load(path: &Path) -> StoreFile {
    match try_load(path) {
        Ok(Some(file)) => file,
        Ok(None) => StoreFile::default(),
        Err(e) => {
            tracing::warn!(path = %path.display(), err = %e, "ignoring unreadable credential file");
            StoreFile::default()
        }
    }
}

fn try_load(path: &Path) -> Result<Option<StoreFile>, ConfigError> {
    let contents = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    if contents.trim().is_empty() {
        return Ok(None);
    }
    Ok(Some(serde_json::from_str(&contents)?))
}

/// Save the credential file atomically (write tmp + rename).
///
/// Uses a unique temp filename (PID + counter) so concurrent saves never
/// share a `.tmp` file. Creates the parent directory on first write and
/// restricts the file to the owner on Unix, since it holds secrets.
pub fn save(path: &Path, file: &StoreFile) -> Result<(), ConfigError> {
    use std::sync::atomic::{AtomicU32, Ordering};
    static COUNTER: AtomicU32 = AtomicU32::new(0);

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let json = serde_json::to_string_pretty(file)?;
    let seq = COUNTER.fetch_add(1, Ordering::Relaxed);
    let tmp_name = format!(
        "{}.{}.{}.tmp",
        path.file_name().unwrap_or_default().to_string_lossy(),
        std::process::id(),
        seq,
    );
    let tmp_path = path.with_file_name(tmp_name);
    std::fs::write(&tmp_path, json)?;
    restrict_permissions(&tmp_path)?;
    if let Err(e) = std::fs::rename(&tmp_path, path) {
        let _ = std::fs::remove_file(&tmp_path);
        return Err(e.into());
    }
    Ok(())
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> std::io::Result<()> {
    Ok(())
}

#[cfg(test)]
#[path = "persist_tests.rs"]
mod tests;
