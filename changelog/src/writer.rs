use crate::error::ChangelogError;
use crate::types::Result;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

/// Mode of a changelog created from scratch, as a plain `fs::write` would leave it
#[cfg(unix)]
const NEW_FILE_MODE: u32 = 0o644;

pub fn backup_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".bak");
    path.with_file_name(name)
}

/// Replaces `path` with `content` so that readers observe either the old or
/// the new file, never a partial one.
///
/// The new content is written to a temporary file next to the target and
/// renamed over it. A `.bak` copy of the previous file exists only while the
/// rename is pending and is kept if the rename fails.
pub fn atomic_write(path: &Path, content: &str) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let fail = |backup: Option<PathBuf>| {
        let path = path.to_path_buf();
        move |source: std::io::Error| ChangelogError::WriteFailed {
            path,
            backup,
            source,
        }
    };

    let mut staged = NamedTempFile::new_in(dir).map_err(fail(None))?;
    staged.write_all(content.as_bytes()).map_err(fail(None))?;
    staged.as_file().sync_all().map_err(fail(None))?;

    let backup = if path.exists() {
        // The staged file is created owner-only
        let permissions = fs::metadata(path).map_err(fail(None))?.permissions();
        staged
            .as_file()
            .set_permissions(permissions)
            .map_err(fail(None))?;

        let backup = backup_path(path);
        fs::copy(path, &backup).map_err(fail(None))?;
        debug!(backup = %backup.display(), "backed up changelog");
        Some(backup)
    } else {
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            staged
                .as_file()
                .set_permissions(fs::Permissions::from_mode(NEW_FILE_MODE))
                .map_err(fail(None))?;
        }
        None
    };

    staged
        .persist(path)
        .map_err(|e| fail(backup.clone())(e.error))?;

    if let Some(backup) = backup {
        if let Err(e) = fs::remove_file(&backup) {
            warn!(backup = %backup.display(), error = %e, "failed to remove changelog backup");
        }
    }

    debug!(path = %path.display(), bytes = content.len(), "changelog written");
    Ok(())
}
