//! Materialized, forward-only query results

use crate::error::{Result, StoreError};
use rusqlite::types::Value;
use std::sync::Arc;

/// Something that can address a column: a name or a 0-based ordinal
pub trait ColumnIndex {
    fn resolve(&self, columns: &[String]) -> Result<usize>;
}

impl ColumnIndex for &str {
    fn resolve(&self, columns: &[String]) -> Result<usize> {
        columns
            .iter()
            .position(|c| c == self)
            .ok_or_else(|| StoreError::MissingColumn(self.to_string()))
    }
}

impl ColumnIndex for usize {
    fn resolve(&self, columns: &[String]) -> Result<usize> {
        if *self < columns.len() {
            Ok(*self)
        } else {
            Err(StoreError::MissingColumn(format!("#{}", self)))
        }
    }
}

/// A single result row
#[derive(Debug, Clone)]
pub struct Row {
    columns: Arc<[String]>,
    values: Vec<Value>,
}

impl Row {
    pub(crate) fn new(columns: Arc<[String]>, values: Vec<Value>) -> Self {
        Self { columns, values }
    }

    /// Raw value of a column
    pub fn value<I: ColumnIndex>(&self, column: I) -> Result<&Value> {
        let idx = column.resolve(&self.columns)?;
        Ok(&self.values[idx])
    }

    pub fn get_i64<I: ColumnIndex>(&self, column: I) -> Result<i64> {
        let idx = column.resolve(&self.columns)?;
        match &self.values[idx] {
            Value::Integer(v) => Ok(*v),
            other => Err(self.type_error(idx, other)),
        }
    }

    /// SQLite stores booleans as integers; any non-zero value is true
    pub fn get_bool<I: ColumnIndex>(&self, column: I) -> Result<bool> {
        Ok(self.get_i64(column)? != 0)
    }

    pub fn get_text<I: ColumnIndex>(&self, column: I) -> Result<String> {
        let idx = column.resolve(&self.columns)?;
        self.optional_text_at(idx)?
            .ok_or_else(|| StoreError::NullColumn(self.columns[idx].clone()))
    }

    /// Text column that may legitimately be NULL
    pub fn get_optional_text<I: ColumnIndex>(&self, column: I) -> Result<Option<String>> {
        let idx = column.resolve(&self.columns)?;
        self.optional_text_at(idx)
    }

    pub fn get_blob<I: ColumnIndex>(&self, column: I) -> Result<&[u8]> {
        let idx = column.resolve(&self.columns)?;
        match &self.values[idx] {
            Value::Blob(bytes) => Ok(bytes),
            Value::Null => Err(StoreError::NullColumn(self.columns[idx].clone())),
            other => Err(self.type_error(idx, other)),
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    fn optional_text_at(&self, idx: usize) -> Result<Option<String>> {
        match &self.values[idx] {
            Value::Text(s) => Ok(Some(s.clone())),
            Value::Null => Ok(None),
            other => Err(self.type_error(idx, other)),
        }
    }

    fn type_error(&self, idx: usize, value: &Value) -> StoreError {
        StoreError::Sqlite(rusqlite::Error::InvalidColumnType(
            idx,
            self.columns[idx].clone(),
            value.data_type(),
        ))
    }
}

/// Forward-only cursor over the rows of a finished query
#[derive(Debug)]
pub struct ResultCursor {
    columns: Arc<[String]>,
    rows: std::vec::IntoIter<Vec<Value>>,
}

impl ResultCursor {
    pub(crate) fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        Self {
            columns: columns.into(),
            rows: rows.into_iter(),
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Rows not yet consumed
    pub fn remaining(&self) -> usize {
        self.rows.len()
    }
}

impl Iterator for ResultCursor {
    type Item = Row;

    fn next(&mut self) -> Option<Row> {
        self.rows
            .next()
            .map(|values| Row::new(Arc::clone(&self.columns), values))
    }
}
