//! Externally supplied SQL scripts: table schema fragment, indexes and functions

use std::path::{Path, PathBuf};

use crate::domain::release_table::TableName;
use crate::domain::DomainError;

/// SQL scripts consumed opaquely by the table swap
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlScripts {
    /// Column definitions of the release table (body of `CREATE TABLE (...)`)
    pub table_schema: String,
    pub indexes: String,
    pub functions: String,
}

impl SqlScripts {
    pub fn new(
        table_schema: impl Into<String>,
        indexes: impl Into<String>,
        functions: impl Into<String>,
    ) -> Self {
        Self {
            table_schema: table_schema.into(),
            indexes: indexes.into(),
            functions: functions.into(),
        }
    }

    /// Load `tables/<table>.sql`, `indexes.sql` and `functions.sql` from `dir`
    pub async fn load(dir: impl AsRef<Path>, table: &TableName) -> Result<Self, DomainError> {
        let dir = dir.as_ref();

        let table_schema =
            read_script(dir.join("tables").join(format!("{}.sql", table.short()))).await?;
        let indexes = read_script(dir.join("indexes.sql")).await?;
        let functions = read_script(dir.join("functions.sql")).await?;

        if table_schema.trim().is_empty() {
            return Err(DomainError::configuration(format!(
                "Schema fragment for table '{}' is empty",
                table
            )));
        }

        Ok(Self {
            table_schema,
            indexes,
            functions,
        })
    }
}

async fn read_script(path: PathBuf) -> Result<String, DomainError> {
    tokio::fs::read_to_string(&path).await.map_err(|e| {
        DomainError::configuration(format!("Failed to read SQL script {}: {}", path.display(), e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sql_dir() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("sql")
    }

    #[tokio::test]
    async fn test_loads_bundled_scripts() {
        let table = TableName::new("team_releases").unwrap();
        let scripts = SqlScripts::load(sql_dir(), &table).await.unwrap();

        assert!(scripts.table_schema.contains("release_date"));
        assert!(scripts.indexes.contains("CREATE INDEX"));
        assert!(scripts.functions.contains("CREATE FUNCTION"));
    }

    #[tokio::test]
    async fn test_schema_is_keyed_by_short_table_name() {
        let table = TableName::new("public.team_releases").unwrap();
        assert!(SqlScripts::load(sql_dir(), &table).await.is_ok());
    }

    #[tokio::test]
    async fn test_missing_table_schema_is_configuration_error() {
        let table = TableName::new("no_such_table").unwrap();
        let result = SqlScripts::load(sql_dir(), &table).await;

        assert!(matches!(result, Err(DomainError::Configuration { .. })));
    }
}
