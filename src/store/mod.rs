//! SQLite-backed storage for clients, loans and payments.
//!
//! Each table gets a small module of free functions taking a
//! [`rusqlite::Connection`]. A [`rusqlite::Transaction`] derefs to a
//! connection, so the same functions run inside the transactions opened by
//! the tracker.

pub mod clients;
pub mod loans;
pub mod payments;

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, Type, ValueRef};
use rusqlite::{Connection, Row, Transaction};
use rust_decimal::Decimal;
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::DatabaseConfig;
use crate::decimal::{Money, Rate};
use crate::errors::Result;
use crate::types::{LoanStatus, PaymentFrequency};

/// Schema SQL embedded at compile time.
const SCHEMA_SQL: &str = include_str!("schema.sql");

/// owner of the local database connection
pub struct Store {
    conn: Connection,
    path: Option<PathBuf>,
}

impl Store {
    /// Opens or creates a store at `path`, applying the schema if absent.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path)?;
        Self::initialize(&conn)?;
        info!(path = %path.display(), "opened loan store");

        Ok(Self {
            conn,
            path: Some(path.to_path_buf()),
        })
    }

    /// Creates an in-memory store for testing.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::initialize(&conn)?;

        Ok(Self { conn, path: None })
    }

    pub fn open_with_config(config: &DatabaseConfig) -> Result<Self> {
        let store = match &config.path {
            Some(path) => Self::open(path)?,
            None => Self::in_memory()?,
        };
        store
            .conn
            .busy_timeout(Duration::from_millis(config.busy_timeout_ms))?;
        Ok(store)
    }

    fn initialize(conn: &Connection) -> Result<()> {
        conn.execute_batch(SCHEMA_SQL)?;
        debug!("schema ready");
        Ok(())
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Begins a transaction; dropping it without commit rolls back.
    pub fn transaction(&mut self) -> Result<Transaction<'_>> {
        Ok(self.conn.transaction()?)
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

/// read a uuid stored as text
pub(crate) fn id_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Uuid> {
    let raw: String = row.get(idx)?;
    Uuid::parse_str(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

impl ToSql for Money {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_decimal().to_string()))
    }
}

impl FromSql for Money {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value {
            ValueRef::Text(_) => Money::from_str_exact(value.as_str()?)
                .map_err(|e| FromSqlError::Other(Box::new(e))),
            ValueRef::Integer(i) => Ok(Money::from_major(i)),
            // rows written by the old floating-point schema
            ValueRef::Real(f) => Decimal::try_from(f)
                .map(Money::from_decimal)
                .map_err(|e| FromSqlError::Other(Box::new(e))),
            _ => Err(FromSqlError::InvalidType),
        }
    }
}

impl ToSql for Rate {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_percentage().to_string()))
    }
}

impl FromSql for Rate {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value {
            ValueRef::Text(_) => Rate::from_percentage_str(value.as_str()?)
                .map_err(|e| FromSqlError::Other(Box::new(e))),
            ValueRef::Integer(i) => Ok(Rate::from_percentage(Decimal::from(i))),
            ValueRef::Real(f) => Decimal::try_from(f)
                .map(Rate::from_percentage)
                .map_err(|e| FromSqlError::Other(Box::new(e))),
            _ => Err(FromSqlError::InvalidType),
        }
    }
}

impl ToSql for LoanStatus {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for LoanStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        LoanStatus::from_str(value.as_str()?).map_err(|e| FromSqlError::Other(e.into()))
    }
}

impl ToSql for PaymentFrequency {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for PaymentFrequency {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        PaymentFrequency::from_str(value.as_str()?).map_err(|e| FromSqlError::Other(e.into()))
    }
}
