//! Relational store: table creation, atomic batch upserts, read access for
//! reports.
//!
//! A [`Store`] is one scoped session. Open it per request and let it drop; the
//! connection is closed on every exit path and any uncommitted transaction is
//! rolled back.

use std::{path::Path, time::Duration};

use itertools::Itertools;
use log::{debug, error, info};
use rusqlite::{Connection, OpenFlags, TransactionBehavior, params_from_iter};

use crate::{config::StoreConfig, error::StoreError, records::Batch, schema::Schema};

const CREATE_TABLES: &str = "
CREATE TABLE IF NOT EXISTS departments (
    id INTEGER PRIMARY KEY,
    department TEXT
);
CREATE TABLE IF NOT EXISTS jobs (
    id INTEGER PRIMARY KEY,
    job TEXT
);
CREATE TABLE IF NOT EXISTS employees (
    id INTEGER PRIMARY KEY,
    name TEXT,
    datetime TEXT,
    department_id INTEGER NULL REFERENCES departments(id),
    job_id INTEGER NULL REFERENCES jobs(id)
);
";

pub struct Store {
    conn: Connection,
}

impl Store {
    /// Opens (or creates) the database described by `config` and makes sure
    /// the tables exist.
    pub fn open(config: &StoreConfig) -> Result<Self, StoreError> {
        let path = config.database.as_path();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| StoreError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE,
        )?;
        conn.busy_timeout(Duration::from_millis(config.busy_timeout_ms))?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        let store = Self::prepare(conn)?;
        debug!("Store session opened at {}", path.display());
        Ok(store)
    }

    /// Opens an existing database for reading. Nothing is created: a missing
    /// file is an error rather than a new empty store.
    pub fn open_read_only(config: &StoreConfig) -> Result<Self, StoreError> {
        let path = config.database.as_path();
        if !database_exists(path) {
            return Err(StoreError::MissingDatabase {
                path: path.to_path_buf(),
            });
        }
        let conn = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)?;
        conn.busy_timeout(Duration::from_millis(config.busy_timeout_ms))?;
        debug!("Read-only store session opened at {}", path.display());
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::prepare(Connection::open_in_memory()?)
    }

    fn prepare(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        let store = Self { conn };
        store.initialize()?;
        Ok(store)
    }

    /// Creates the entity tables when missing. Safe to run repeatedly.
    pub fn initialize(&self) -> Result<(), StoreError> {
        self.conn.execute_batch(CREATE_TABLES)?;
        Ok(())
    }

    /// Read-only access for the report queries.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Inserts every record of `batch`, overwriting all non-key columns of
    /// rows whose id already exists. Either the whole batch is applied or
    /// none of it.
    pub fn upsert(&mut self, batch: &Batch) -> Result<usize, StoreError> {
        if batch.is_empty() {
            return Ok(0);
        }
        let schema = batch.kind().schema();
        let sql = upsert_statement(schema);
        debug!("Upsert statement for {}: {}", schema.kind, sql);

        // Dropping the transaction without commit rolls it back.
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let written = {
            let mut stmt = tx.prepare(&sql)?;
            let mut written = 0;
            for (row_idx, row) in batch.rows().into_iter().enumerate() {
                written += stmt.execute(params_from_iter(row)).inspect_err(|err| {
                    error!(
                        "Upsert of {} row {row_idx} failed, rolling back batch: {err}",
                        schema.kind
                    );
                })?;
            }
            written
        };
        tx.commit()?;
        info!("Upserted {written} {} row(s)", schema.kind);
        Ok(written)
    }

    pub fn count(&self, schema: &Schema) -> Result<i64, StoreError> {
        let sql = format!("SELECT COUNT(*) FROM {}", schema.kind);
        Ok(self.conn.query_row(&sql, [], |row| row.get(0))?)
    }
}

/// `INSERT ... ON CONFLICT(id) DO UPDATE SET <every non-key column>`.
pub fn upsert_statement(schema: &Schema) -> String {
    let columns = schema.columns.iter().map(|c| c.name).join(", ");
    let placeholders = (1..=schema.width()).map(|i| format!("?{i}")).join(", ");
    let updates = schema
        .value_columns()
        .iter()
        .map(|c| format!("{0} = excluded.{0}", c.name))
        .join(", ");
    format!(
        "INSERT INTO {table} ({columns}) VALUES ({placeholders}) \
         ON CONFLICT(id) DO UPDATE SET {updates}",
        table = schema.kind
    )
}

pub fn database_exists(path: &Path) -> bool {
    path.is_file()
}
