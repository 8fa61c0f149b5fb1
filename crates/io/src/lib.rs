// File I/O operations

pub mod csv;
pub mod error;
pub mod json;

pub use error::TableIoError;

use std::fs;
use std::io::Write;
use std::path::Path;

/// Write `bytes` to a temp file next to `path` and rename it over `path`.
/// An existing destination keeps its permissions; a new one gets 0o666
/// minus the process umask, like a plain `File::create`.
pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), TableIoError> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let write_err = |source| TableIoError::Write {
        path: path.to_path_buf(),
        source,
    };

    let mut builder = tempfile::Builder::new();
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(fs::Permissions::from_mode(0o666));
    }
    let mut tmp = builder.tempfile_in(dir).map_err(write_err)?;
    if let Ok(existing) = fs::metadata(path) {
        tmp.as_file().set_permissions(existing.permissions()).map_err(write_err)?;
    }
    tmp.write_all(bytes).map_err(write_err)?;
    tmp.as_file().sync_all().map_err(write_err)?;
    tmp.persist(path).map_err(|e| write_err(e.error))?;
    Ok(())
}
