use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReconError {
    /// TOML parse / deserialization error.
    #[error("config parse error: {0}")]
    ConfigParse(String),
    /// Config validation error (empty column name, duplicate override, etc.).
    #[error("config validation error: {0}")]
    ConfigValidation(String),
    /// Missing required column in a table.
    #[error("{table} table: missing column '{column}'")]
    MissingColumn { table: String, column: String },
    /// Two header cells share a name.
    #[error("duplicate column '{0}'")]
    DuplicateColumn(String),
    /// Row width does not match the header.
    #[error("row {row}: expected {expected} field(s), found {found}")]
    RowWidth { row: usize, expected: usize, found: usize },
}

impl ReconError {
    pub fn missing_column(table: &str, column: &str) -> Self {
        Self::MissingColumn {
            table: table.into(),
            column: column.into(),
        }
    }
}
