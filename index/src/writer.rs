//! Writes registrar output files.

use std::fs;
use std::io::Write;
use std::path::Path;

use crate::error::{IndexError, Result};

/// Replaces the contents of `path` with `content` in one step.
///
/// The data goes to a temporary file in the same directory which is then
/// renamed over `path`, so readers never observe a half-written document.
/// The replaced file keeps its permissions; new files get `0644` on Unix.
///
/// # Errors
///
/// Returns [`IndexError::Io`] if the temporary file cannot be created,
/// written or renamed.
pub fn write_atomic(path: &Path, content: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut temp =
        tempfile::NamedTempFile::new_in(dir).map_err(|e| IndexError::io(dir, e))?;
    temp.write_all(content)
        .and_then(|()| match fs::metadata(path) {
            Ok(existing) => temp.as_file().set_permissions(existing.permissions()),
            Err(_) => set_default_permissions(temp.as_file()),
        })
        .and_then(|()| temp.as_file().sync_all())
        .map_err(|e| IndexError::io(temp.path(), e))?;
    temp.persist(path).map_err(|e| IndexError::io(path, e.error))?;
    Ok(())
}

#[cfg(unix)]
fn set_default_permissions(file: &fs::File) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    file.set_permissions(fs::Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn set_default_permissions(_file: &fs::File) -> std::io::Result<()> {
    Ok(())
}

/// Writes `content` to `path`, creating or truncating it.
///
/// # Errors
///
/// Returns [`IndexError::Io`] if the file cannot be written.
pub fn write_truncate(path: &Path, content: &str) -> Result<()> {
    fs::write(path, content).map_err(|e| IndexError::io(path, e))
}

/// Reads a whole document into memory.
///
/// # Errors
///
/// Returns [`IndexError::Io`] if the file cannot be read or is not UTF-8.
pub fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| IndexError::io(path, e))
}
