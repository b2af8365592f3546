// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Versioned ledger store on top of SQLite.
//!
//! The schema version lives in SQLite's `user_version`. Opening at a higher
//! version than the file carries runs [`ensure_store`] inside one write
//! transaction; it only ever adds what is missing. Opening at a lower version
//! opens the file as it is.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use directories::ProjectDirs;
use once_cell::sync::Lazy;
use rusqlite::{Connection, Transaction, TransactionBehavior};
use tokio::sync::OnceCell;
use tracing::{debug, info};

use crate::error::{LedgerError, Result};

static APP: Lazy<(&str, &str, &str)> =
    Lazy::new(|| ("com.alphavelocity", "Costbook", "costbook"));

pub const DB_NAME: &str = "costsdb";
pub const SCHEMA_VERSION: u32 = 2;
pub const STORE: &str = "costs";
pub const BY_YEAR_MONTH: &str = "by_year_month";
pub const BY_CATEGORY: &str = "by_category";

// Every column except the key, with the declaration used when an older
// table has to grow it.
const COLUMNS: [(&str, &str); 9] = [
    ("amount", "TEXT NOT NULL DEFAULT '0'"),
    ("currency", "TEXT NOT NULL DEFAULT 'USD'"),
    ("category", "TEXT NOT NULL DEFAULT ''"),
    ("description", "TEXT NOT NULL DEFAULT ''"),
    ("created_at", "TEXT"),
    ("created_year", "INTEGER"),
    ("created_month", "INTEGER"),
    ("created_day", "INTEGER"),
    ("date", "TEXT"),
];

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from(APP.0, APP.1, APP.2)
}

pub fn data_dir() -> Result<PathBuf> {
    let proj = project_dirs().ok_or_else(|| {
        LedgerError::Unsupported("could not determine a platform data directory".into())
    })?;
    let dir = proj.data_dir().to_path_buf();
    fs::create_dir_all(&dir)?;
    Ok(dir)
}

pub fn config_dir() -> Option<PathBuf> {
    project_dirs().map(|p| p.config_dir().to_path_buf())
}

pub fn db_path(dir: &Path, name: &str) -> PathBuf {
    dir.join(format!("{}.sqlite", name))
}

/// Opens `name` in the platform data directory.
pub fn open(name: &str, version: Option<u32>) -> Result<StoreHandle> {
    let dir = data_dir()?;
    open_at(&dir, name, version)
}

pub fn open_at(dir: &Path, name: &str, version: Option<u32>) -> Result<StoreHandle> {
    fs::create_dir_all(dir)?;
    let path = db_path(dir, name);
    let conn = Connection::open(&path)?;
    debug!(path = %path.display(), "opened ledger store");
    init(conn, name, version, Some(path))
}

pub fn open_in_memory(version: Option<u32>) -> Result<StoreHandle> {
    init(Connection::open_in_memory()?, ":memory:", version, None)
}

fn init(
    mut conn: Connection,
    name: &str,
    version: Option<u32>,
    path: Option<PathBuf>,
) -> Result<StoreHandle> {
    let version = migrate(&mut conn, version)?;
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS settings(
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );",
    )?;
    Ok(StoreHandle {
        conn: Arc::new(Mutex::new(conn)),
        name: name.to_string(),
        version,
        path,
    })
}

pub fn user_version(conn: &Connection) -> rusqlite::Result<u32> {
    conn.pragma_query_value(None, "user_version", |r| r.get(0))
}

fn migrate(conn: &mut Connection, requested: Option<u32>) -> Result<u32> {
    let on_disk = user_version(conn)?;
    let target = match requested.filter(|v| *v > 0) {
        Some(v) if v < on_disk => {
            debug!(
                requested = v,
                on_disk, "store is newer than requested, opening at its version"
            );
            on_disk
        }
        Some(v) => v,
        None if on_disk == 0 => 1,
        None => on_disk,
    };
    if target > on_disk {
        let tx = conn.transaction()?;
        ensure_store(&tx)?;
        tx.pragma_update(None, "user_version", target)?;
        tx.commit()?;
        info!(from = on_disk, to = target, "ledger store upgraded");
    }
    Ok(target)
}

/// Creates the record table, its missing columns and both indexes.
pub fn ensure_store(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(&format!(
        "CREATE TABLE IF NOT EXISTS {STORE}(
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            amount TEXT NOT NULL DEFAULT '0',
            currency TEXT NOT NULL DEFAULT 'USD',
            category TEXT NOT NULL DEFAULT '',
            description TEXT NOT NULL DEFAULT '',
            created_at TEXT,
            created_year INTEGER,
            created_month INTEGER,
            created_day INTEGER,
            date TEXT
        );"
    ))?;

    let existing = table_columns(conn, STORE)?;
    for (name, decl) in COLUMNS {
        if !existing.iter().any(|c| c == name) {
            conn.execute_batch(&format!("ALTER TABLE {STORE} ADD COLUMN {name} {decl};"))?;
            debug!(column = name, "added missing column");
        }
    }

    conn.execute_batch(&format!(
        "CREATE INDEX IF NOT EXISTS {BY_YEAR_MONTH} ON {STORE}(created_year, created_month);
         CREATE INDEX IF NOT EXISTS {BY_CATEGORY} ON {STORE}(category);"
    ))?;
    Ok(())
}

fn table_columns(conn: &Connection, table: &str) -> rusqlite::Result<Vec<String>> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", table))?;
    let rows = stmt.query_map([], |r| r.get::<_, String>(1))?;
    rows.collect()
}

pub fn index_exists(conn: &Connection, index: &str) -> rusqlite::Result<bool> {
    conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='index' AND name=?1)",
        [index],
        |r| r.get(0),
    )
}

/// An opened store. Cloning shares the same connection.
#[derive(Debug, Clone)]
pub struct StoreHandle {
    conn: Arc<Mutex<Connection>>,
    name: String,
    version: u32,
    path: Option<PathBuf>,
}

impl StoreHandle {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Runs `f` inside one deferred (read) transaction on a blocking worker.
    pub async fn read<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Transaction<'_>) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        self.run(TransactionBehavior::Deferred, f).await
    }

    /// Runs `f` inside one immediate (read-write) transaction.
    pub async fn write<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Transaction<'_>) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        self.run(TransactionBehavior::Immediate, f).await
    }

    async fn run<T, F>(&self, behavior: TransactionBehavior, f: F) -> Result<T>
    where
        F: FnOnce(&Transaction<'_>) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut guard = conn
                .lock()
                .map_err(|_| LedgerError::Task("connection lock poisoned".into()))?;
            let tx = guard.transaction_with_behavior(behavior)?;
            let out = f(&tx)?;
            tx.commit()?;
            Ok(out)
        })
        .await
        .map_err(|e| LedgerError::Task(e.to_string()))?
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    /// Platform data directory.
    DataDir,
    Dir(PathBuf),
    Memory,
}

/// Opens the store on first use and hands every later caller the same handle.
#[derive(Debug)]
pub struct LazyStore {
    location: Location,
    name: String,
    version: Option<u32>,
    cell: OnceCell<StoreHandle>,
}

impl LazyStore {
    pub fn new(location: Location, name: impl Into<String>, version: Option<u32>) -> Self {
        Self {
            location,
            name: name.into(),
            version,
            cell: OnceCell::new(),
        }
    }

    pub async fn handle(&self) -> Result<&StoreHandle> {
        self.cell
            .get_or_try_init(|| async {
                let location = self.location.clone();
                let name = self.name.clone();
                let version = self.version;
                tokio::task::spawn_blocking(move || match location {
                    Location::DataDir => open(&name, version),
                    Location::Dir(dir) => open_at(&dir, &name, version),
                    Location::Memory => open_in_memory(version),
                })
                .await
                .map_err(|e| LedgerError::Task(e.to_string()))?
            })
            .await
    }
}
