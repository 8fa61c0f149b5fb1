// CSV import/export

use std::io::Read;
use std::path::Path;
use std::str::FromStr;

use legiscrub_recon::model::{Table, Value};
use tracing::debug;

use crate::error::TableIoError;

/// Byte encoding of an input file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Encoding {
    /// Strict: any invalid sequence is a parse error
    #[default]
    Utf8,
    /// Legacy single-byte exports; every byte decodes
    Windows1252,
}

impl FromStr for Encoding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "utf-8" | "utf8" => Ok(Encoding::Utf8),
            "windows-1252" | "cp1252" => Ok(Encoding::Windows1252),
            other => Err(format!("unsupported encoding '{other}' (expected utf-8 or windows-1252)")),
        }
    }
}

/// Read a UTF-8 comma-separated file with a header row into a `Table`.
pub fn read_table(path: &Path) -> Result<Table, TableIoError> {
    read_table_with_encoding(path, Encoding::Utf8)
}

pub fn read_table_with_encoding(path: &Path, encoding: Encoding) -> Result<Table, TableIoError> {
    let content = read_file_as_utf8(path, encoding)?;
    let table = read_table_from_str(&content).map_err(|message| TableIoError::Parse {
        path: path.to_path_buf(),
        message,
    })?;
    debug!(path = %path.display(), rows = table.len(), columns = table.width(), ?encoding, "read table");
    Ok(table)
}

/// Parse CSV text. The first record is the header; every later record must
/// have the same number of fields. Empty fields become `Value::Missing`.
pub fn read_table_from_str(content: &str) -> Result<Table, String> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| e.to_string())?
        .iter()
        .map(str::to_string)
        .collect();
    if headers.iter().all(|h| h.is_empty()) {
        return Err("missing header row".into());
    }

    let mut table = Table::new(headers).map_err(|e| e.to_string())?;
    for result in reader.records() {
        let record = result.map_err(|e| e.to_string())?;
        table
            .push_row(record.iter().map(Value::from_field).collect())
            .map_err(|e| e.to_string())?;
    }
    Ok(table)
}

/// Read a file and decode it to a `String`. With `Encoding::Utf8` the first
/// invalid byte is reported by offset and nothing is decoded.
pub fn read_file_as_utf8(path: &Path, encoding: Encoding) -> Result<String, TableIoError> {
    let mut file = std::fs::File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => TableIoError::NotFound(path.to_path_buf()),
        _ => TableIoError::Read {
            path: path.to_path_buf(),
            source: e,
        },
    })?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes).map_err(|e| TableIoError::Read {
        path: path.to_path_buf(),
        source: e,
    })?;

    match encoding {
        Encoding::Utf8 => String::from_utf8(bytes).map_err(|e| TableIoError::Parse {
            path: path.to_path_buf(),
            message: format!("invalid UTF-8 at byte offset {}", e.utf8_error().valid_up_to()),
        }),
        Encoding::Windows1252 => {
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            Ok(decoded.into_owned())
        }
    }
}

/// Serialize a table as UTF-8 CSV: header row, then one record per row.
/// Missing cells are written as empty fields, numbers in their original
/// spelling.
pub fn table_to_csv(table: &Table) -> Result<Vec<u8>, csv::Error> {
    let mut writer = csv::WriterBuilder::new().from_writer(Vec::new());
    writer.write_record(table.headers())?;
    for row in table.rows() {
        writer.write_record(row.iter().map(Value::as_field))?;
    }
    writer.into_inner().map_err(|e| e.into_error().into())
}

/// Write a table to `path`, replacing any existing file.
pub fn write_table(table: &Table, path: &Path) -> Result<(), TableIoError> {
    let bytes = table_to_csv(table).map_err(|e| TableIoError::Write {
        path: path.to_path_buf(),
        source: e.into(),
    })?;
    crate::write_atomic(path, &bytes)?;
    debug!(path = %path.display(), rows = table.len(), "wrote table");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_read_typed_cells() {
        let table = read_table_from_str("id,cong,mc.name,state\n10713,110,Joe Baca,\n").unwrap();
        assert_eq!(table.headers(), &["id", "cong", "mc.name", "state"]);
        assert_eq!(table.len(), 1);
        assert!(matches!(table.get(0, "id"), Some(Value::Number(_))));
        assert_eq!(table.get(0, "mc.name"), Some(&Value::text("Joe Baca")));
        assert_eq!(table.get(0, "state"), Some(&Value::Missing));
    }

    #[test]
    fn test_quoted_fields() {
        let table = read_table_from_str("name,note\n\"Doe, Jane\",\"said \"\"hi\"\"\"\n").unwrap();
        assert_eq!(table.get(0, "name"), Some(&Value::text("Doe, Jane")));
        assert_eq!(table.get(0, "note"), Some(&Value::text("said \"hi\"")));
    }

    #[test]
    fn test_bom_is_stripped() {
        let table = read_table_from_str("\u{feff}id,name\n1,A\n").unwrap();
        assert_eq!(table.headers()[0], "id");
    }

    #[test]
    fn test_ragged_row_is_error() {
        let err = read_table_from_str("a,b,c\n1,2,3\n4,5\n").unwrap_err();
        assert!(err.contains("2 fields"), "{err}");
    }

    #[test]
    fn test_empty_input_is_error() {
        assert_eq!(read_table_from_str("").unwrap_err(), "missing header row");
    }

    #[test]
    fn test_duplicate_header_is_error() {
        let err = read_table_from_str("id,id\n1,2\n").unwrap_err();
        assert!(err.contains("id"), "{err}");
    }

    #[test]
    fn test_missing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nope.csv");
        assert!(matches!(read_table(&path), Err(TableIoError::NotFound(p)) if p == path));
    }

    #[test]
    fn test_invalid_utf8_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("mixed.csv");
        // Valid "José" on row 1, a stray 0xFF on row 2
        fs::write(&path, b"id,name\n1,Jos\xc3\xa9\n2,\xffx\n").unwrap();
        match read_table(&path) {
            Err(TableIoError::Parse { path: p, message }) => {
                assert_eq!(p, path);
                assert_eq!(message, "invalid UTF-8 at byte offset 18");
            }
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_explicit_windows_1252() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("latin.csv");
        // "José" with é as 0xE9
        fs::write(&path, b"id,name\n1,Jos\xe9\n").unwrap();
        assert!(matches!(read_table(&path), Err(TableIoError::Parse { .. })));

        let table = read_table_with_encoding(&path, Encoding::Windows1252).unwrap();
        assert_eq!(table.get(0, "name"), Some(&Value::text("José")));
    }

    #[test]
    fn test_encoding_names() {
        assert_eq!("UTF-8".parse::<Encoding>(), Ok(Encoding::Utf8));
        assert_eq!("cp1252".parse::<Encoding>(), Ok(Encoding::Windows1252));
        assert!("latin-9".parse::<Encoding>().is_err());
    }

    #[test]
    fn test_write_preserves_spelling_and_missing() {
        let table = read_table_from_str("id,cong,name,note\n007,110.0,\"Doe, Jane\",\n").unwrap();
        let out = String::from_utf8(table_to_csv(&table).unwrap()).unwrap();
        assert_eq!(out, "id,cong,name,note\n007,110.0,\"Doe, Jane\",\n");
    }

    #[test]
    fn test_header_only_table() {
        let table = read_table_from_str("id,cong\n").unwrap();
        assert!(table.is_empty());
        let out = String::from_utf8(table_to_csv(&table).unwrap()).unwrap();
        assert_eq!(out, "id,cong\n");
    }

    #[test]
    fn test_write_table_replaces_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.csv");
        fs::write(&path, "stale").unwrap();

        let table = read_table_from_str("a,b\n1,x\n2,y\n").unwrap();
        write_table(&table, &path).unwrap();

        let back = read_table(&path).unwrap();
        assert_eq!(back, table);
        // No temp files left next to the output
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_write_into_missing_dir_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing").join("out.csv");
        let table = read_table_from_str("a\n1\n").unwrap();
        assert!(matches!(write_table(&table, &path), Err(TableIoError::Write { .. })));
    }
}
