// JSON export

use std::path::Path;

use serde::Serialize;

use crate::error::TableIoError;

/// Write any serializable value (the run report) as pretty-printed JSON.
pub fn write_json<T: Serialize>(value: &T, path: &Path) -> Result<(), TableIoError> {
    let mut bytes = serde_json::to_vec_pretty(value).map_err(|e| TableIoError::Write {
        path: path.to_path_buf(),
        source: e.into(),
    })?;
    bytes.push(b'\n');
    crate::write_atomic(path, &bytes)
}
