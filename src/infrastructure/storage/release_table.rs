//! PostgreSQL implementation of the release table swap

use std::fmt::Write as _;

use async_trait::async_trait;
use sqlx::pool::PoolConnection;
use sqlx::postgres::{PgConnection, PgPool, Postgres};
use sqlx::{Connection, Executor};

use crate::domain::rating::{TeamRelease, RELEASE_DATE_FORMAT};
use crate::domain::release_table::{FunctionsOutcome, ReleaseTableStore, TableName};
use crate::domain::DomainError;

/// SQLSTATE for `duplicate_function`
const DUPLICATE_FUNCTION: &str = "42723";

const DEFAULT_CHUNK_ROWS: usize = 10_000;

/// Columns of the release table, in COPY order
pub const RELEASE_COLUMNS: &str = "team_id, release_id, release_date, rating";

/// Release table store bound to one pooled connection for the whole swap
///
/// The connection is taken from the pool on the first swap step, not at construction,
/// so it never sits idle while ratings are being fetched.
pub struct PostgresReleaseTableStore {
    pool: PgPool,
    conn: Option<PoolConnection<Postgres>>,
    chunk_rows: usize,
}

impl std::fmt::Debug for PostgresReleaseTableStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgresReleaseTableStore")
            .field("connected", &self.conn.is_some())
            .field("chunk_rows", &self.chunk_rows)
            .finish()
    }
}

impl PostgresReleaseTableStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            conn: None,
            chunk_rows: DEFAULT_CHUNK_ROWS,
        }
    }

    /// Rows sent per COPY buffer
    pub fn with_chunk_rows(mut self, rows: usize) -> Self {
        self.chunk_rows = rows.max(1);
        self
    }

    /// Whether the swap connection has been taken from the pool
    pub fn is_connected(&self) -> bool {
        self.conn.is_some()
    }

    async fn connection(&mut self) -> Result<&mut PgConnection, DomainError> {
        if self.conn.is_none() {
            let conn = self.pool.acquire().await.map_err(|e| {
                DomainError::storage(format!("Failed to acquire connection: {}", e))
            })?;
            self.conn = Some(conn);
        }

        self.conn
            .as_deref_mut()
            .ok_or_else(|| DomainError::internal("Swap connection missing after acquire"))
    }

    async fn execute(&mut self, statement: &str) -> Result<(), DomainError> {
        let conn = self.connection().await?;

        sqlx::query(statement)
            .execute(conn)
            .await
            .map_err(|e| DomainError::storage(format!("{}: {}", statement, e)))?;
        Ok(())
    }
}

/// Statements creating a fresh shadow table from a column definition fragment
pub fn stage_statements(table: &TableName, schema: &str) -> [String; 2] {
    let columns = schema.trim().trim_end_matches(';').trim();

    [
        format!("DROP TABLE IF EXISTS {}", table.temp()),
        format!("CREATE TABLE {} ({})", table.temp(), columns),
    ]
}

pub fn copy_statement(table: &TableName) -> String {
    format!(
        "COPY {} ({}) FROM STDIN WITH (FORMAT csv)",
        table.temp(),
        RELEASE_COLUMNS
    )
}

/// Statements promoting the shadow table; run inside one transaction
pub fn promote_statements(table: &TableName) -> [String; 4] {
    [
        format!("DROP TABLE IF EXISTS {} CASCADE", table.old()),
        format!("CREATE TABLE IF NOT EXISTS {} (id int)", table.qualified()),
        format!(
            "ALTER TABLE {} RENAME TO {}",
            table.qualified(),
            table.old_short()
        ),
        format!("ALTER TABLE {} RENAME TO {}", table.temp(), table.short()),
    ]
}

pub fn retire_statement(table: &TableName) -> String {
    format!("DROP TABLE IF EXISTS {} CASCADE", table.old())
}

/// Encode records as CSV rows matching [`RELEASE_COLUMNS`]
pub fn encode_csv(records: &[TeamRelease]) -> String {
    let mut buffer = String::with_capacity(records.len() * 32);

    for record in records {
        // Writing to a String cannot fail
        let _ = writeln!(
            buffer,
            "{},{},{},{}",
            record.team_id,
            record.release_id,
            record.release_date.format(RELEASE_DATE_FORMAT),
            record.rating
        );
    }

    buffer
}

fn is_duplicate_function(error: &sqlx::Error) -> bool {
    error
        .as_database_error()
        .and_then(|e| e.code())
        .is_some_and(|code| code == DUPLICATE_FUNCTION)
}

#[async_trait]
impl ReleaseTableStore for PostgresReleaseTableStore {
    async fn stage(&mut self, table: &TableName, schema: &str) -> Result<(), DomainError> {
        for statement in stage_statements(table, schema) {
            self.execute(&statement).await?;
        }
        Ok(())
    }

    async fn copy(
        &mut self,
        table: &TableName,
        records: &[TeamRelease],
    ) -> Result<u64, DomainError> {
        let statement = copy_statement(table);
        let chunk_rows = self.chunk_rows;
        let conn = self.connection().await?;

        let mut copy = conn
            .copy_in_raw(&statement)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to start COPY: {}", e)))?;

        for chunk in records.chunks(chunk_rows) {
            let sent = copy.send(encode_csv(chunk).into_bytes()).await.map(|_| ());

            if let Err(e) = sent {
                let message = format!("Failed to send COPY data: {}", e);
                let _ = copy.abort(message.clone()).await;
                return Err(DomainError::storage(message));
            }
        }

        copy.finish()
            .await
            .map_err(|e| DomainError::storage(format!("Failed to finish COPY: {}", e)))
    }

    async fn promote(&mut self, table: &TableName) -> Result<(), DomainError> {
        let conn = self.connection().await?;

        let mut tx = conn
            .begin()
            .await
            .map_err(|e| DomainError::storage(format!("Failed to begin transaction: {}", e)))?;

        for statement in promote_statements(table) {
            sqlx::query(&statement)
                .execute(&mut *tx)
                .await
                .map_err(|e| DomainError::storage(format!("{}: {}", statement, e)))?;
        }

        tx.commit()
            .await
            .map_err(|e| DomainError::storage(format!("Failed to commit promotion: {}", e)))
    }

    async fn retire(&mut self, table: &TableName) -> Result<(), DomainError> {
        self.execute(&retire_statement(table)).await
    }

    async fn apply_indexes(&mut self, script: &str) -> Result<(), DomainError> {
        let conn = self.connection().await?;

        // No bind arguments: runs as a simple query, so the script may hold many statements
        Executor::execute(conn, script)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to apply indexes: {}", e)))?;
        Ok(())
    }

    async fn create_functions(&mut self, script: &str) -> Result<FunctionsOutcome, DomainError> {
        let conn = self.connection().await?;

        match Executor::execute(conn, script).await {
            Ok(_) => Ok(FunctionsOutcome::Created),
            Err(e) if is_duplicate_function(&e) => Ok(FunctionsOutcome::AlreadyExisted),
            Err(e) => Err(DomainError::storage(format!(
                "Failed to create functions: {}",
                e
            ))),
        }
    }
}
