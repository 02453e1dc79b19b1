//! SQLite client owning the single connection shared by every repository
//!
//! The connection sits behind a mutex so the client can be shared across
//! threads, but the intended use is one logical owner issuing calls in turn.
//! Closing takes the connection out; every call after that fails with
//! [`StoreError::ConnectionClosed`].

use crate::db::cursor::ResultCursor;
use crate::error::{Result, StoreError};
use parking_lot::Mutex;
use rusqlite::types::{ToSqlOutput, Value, ValueRef};
use rusqlite::{params_from_iter, Connection, ToSql};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, error, info};

/// Parameter value accepted by [`Statement`] and [`SqliteClient::query`]
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Text(String),
    Bool(bool),
    Integer(i64),
    Blob(Vec<u8>),
    Null,
}

impl ToSql for SqlValue {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            SqlValue::Text(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
            SqlValue::Bool(b) => ToSqlOutput::Owned(Value::Integer(i64::from(*b))),
            SqlValue::Integer(i) => ToSqlOutput::Owned(Value::Integer(*i)),
            SqlValue::Blob(bytes) => ToSqlOutput::Borrowed(ValueRef::Blob(bytes)),
            SqlValue::Null => ToSqlOutput::Owned(Value::Null),
        })
    }
}

/// Parameterized statement with positional placeholders bound by 1-based index
#[derive(Debug, Clone)]
pub struct Statement {
    sql: String,
    parameter_count: usize,
    params: BTreeMap<usize, SqlValue>,
}

impl Statement {
    pub fn bind_text(&mut self, index: usize, value: impl Into<String>) -> &mut Self {
        self.params.insert(index, SqlValue::Text(value.into()));
        self
    }

    pub fn bind_bool(&mut self, index: usize, value: bool) -> &mut Self {
        self.params.insert(index, SqlValue::Bool(value));
        self
    }

    pub fn bind_int(&mut self, index: usize, value: i64) -> &mut Self {
        self.params.insert(index, SqlValue::Integer(value));
        self
    }

    pub fn bind_blob(&mut self, index: usize, value: Vec<u8>) -> &mut Self {
        self.params.insert(index, SqlValue::Blob(value));
        self
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Number of placeholders in the SQL
    pub fn parameter_count(&self) -> usize {
        self.parameter_count
    }

    fn check_bindings(&self) -> Result<()> {
        if let Some((&index, _)) = self
            .params
            .iter()
            .find(|&(&i, _)| i == 0 || i > self.parameter_count)
        {
            return Err(StoreError::InvalidStatement(format!(
                "parameter index {} out of range 1..={} for: {}",
                index, self.parameter_count, self.sql
            )));
        }
        if let Some(missing) = (1..=self.parameter_count).find(|i| !self.params.contains_key(i)) {
            return Err(StoreError::InvalidStatement(format!(
                "parameter {} is unbound for: {}",
                missing, self.sql
            )));
        }
        Ok(())
    }
}

/// Embedded SQLite database holding the NPC memory tables
pub struct SqliteClient {
    conn: Mutex<Option<Connection>>,
    location: String,
}

impl SqliteClient {
    /// Open or create a SQLite database file, creating parent directories
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            if !parent.exists() {
                std::fs::create_dir_all(parent)?;
                info!(dir = %parent.display(), "database directory created");
            }
        }

        let conn = Connection::open(path)?;
        info!(path = %path.display(), "database created or opened");

        Ok(Self {
            conn: Mutex::new(Some(conn)),
            location: path.display().to_string(),
        })
    }

    /// Create an in-memory database for testing
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self {
            conn: Mutex::new(Some(conn)),
            location: ":memory:".to_string(),
        })
    }

    /// Path of the database file, or `:memory:`
    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn is_open(&self) -> bool {
        self.conn.lock().is_some()
    }

    fn with_connection<T>(&self, f: impl FnOnce(&Connection) -> Result<T>) -> Result<T> {
        let guard = self.conn.lock();
        let conn = guard.as_ref().ok_or(StoreError::ConnectionClosed)?;
        f(conn)
    }

    /// Run schema-definition SQL. Callers use `IF NOT EXISTS` so this is idempotent.
    pub fn execute_ddl(&self, sql: &str) -> Result<()> {
        self.with_connection(|conn| {
            conn.execute_batch(sql).map_err(|e| {
                error!(error = %e, "schema statement failed");
                StoreError::Schema(format!("{}: {}", e, sql.trim()))
            })?;
            debug!(sql = sql.trim(), "executed DDL");
            Ok(())
        })
    }

    /// Validate SQL against the live connection and return an unbound statement
    pub fn prepare(&self, sql: &str) -> Result<Statement> {
        self.with_connection(|conn| {
            let stmt = conn
                .prepare(sql)
                .map_err(|e| StoreError::InvalidStatement(format!("{}: {}", e, sql)))?;
            Ok(Statement {
                sql: sql.to_string(),
                parameter_count: stmt.parameter_count(),
                params: BTreeMap::new(),
            })
        })
    }

    /// Run a prepared insert. The generated row id is not reported.
    pub fn execute_insert(&self, statement: &Statement) -> Result<()> {
        statement.check_bindings()?;
        self.with_connection(|conn| {
            let mut stmt = conn.prepare_cached(&statement.sql)?;
            for (&index, value) in &statement.params {
                stmt.raw_bind_parameter(index, value)?;
            }
            let changed = stmt.raw_execute()?;
            debug!(sql = %statement.sql, changed, "executed insert");
            Ok(())
        })
    }

    /// Run a read query without parameters
    pub fn execute_query(&self, sql: &str) -> Result<ResultCursor> {
        self.query(sql, &[])
    }

    /// Run a read query with positional parameters and materialize every row
    pub fn query(&self, sql: &str, params: &[SqlValue]) -> Result<ResultCursor> {
        self.with_connection(|conn| {
            let mut stmt = conn.prepare(sql)?;
            let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
            let width = columns.len();

            let mut rows = stmt.query(params_from_iter(params.iter()))?;
            let mut materialized = Vec::new();
            while let Some(row) = rows.next()? {
                let mut values = Vec::with_capacity(width);
                for idx in 0..width {
                    values.push(row.get::<_, Value>(idx)?);
                }
                materialized.push(values);
            }

            debug!(sql, rows = materialized.len(), "executed query");
            Ok(ResultCursor::new(columns, materialized))
        })
    }

    /// Check whether a table exists in the schema
    pub fn table_exists(&self, table: &str) -> Result<bool> {
        self.with_connection(|conn| {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
                [table],
                |row| row.get(0),
            )?;
            Ok(count > 0)
        })
    }

    /// Number of rows in a table
    pub fn count(&self, table: &str) -> Result<usize> {
        self.with_connection(|conn| {
            let count: i64 =
                conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
                    row.get(0)
                })?;
            Ok(count as usize)
        })
    }

    /// Close the connection. Closing twice is a no-op.
    pub fn close(&self) -> Result<()> {
        let Some(conn) = self.conn.lock().take() else {
            return Ok(());
        };
        match conn.close() {
            Ok(()) => {
                info!(path = %self.location, "database connection closed");
                Ok(())
            }
            Err((_, e)) => {
                error!(error = %e, "error closing database connection");
                Err(e.into())
            }
        }
    }
}
