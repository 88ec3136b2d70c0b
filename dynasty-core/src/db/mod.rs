//! Document store backed by a single SQLite connection.
//!
//! [`Database`] is an explicit, cloneable handle: it is opened once, passed to
//! whoever needs it, and released with [`Database::close`] (or when the last
//! clone is dropped). All access goes through [`Database::with_connection`],
//! which holds the connection lock for the duration of the closure, so a
//! read-modify-write of one aggregate never interleaves with another request.

mod coaches;
mod schedules;
pub mod schema;
mod schools;

use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Context;
use rusqlite::{Connection, Transaction};

use crate::error::{StoreError, StoreResult};

pub use schools::SeedReport;

#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Opens (creating if needed) a database file.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        tracing::info!(path = %path.display(), "opening database");
        Self::from_connection(Connection::open(path)?)
    }

    /// Opens the database in the platform data directory.
    pub fn open_default() -> anyhow::Result<Self> {
        let dirs = directories::ProjectDirs::from("", "", "dynasty")
            .context("could not determine a data directory")?;
        let data_dir = dirs.data_dir();
        std::fs::create_dir_all(data_dir)
            .with_context(|| format!("failed to create {}", data_dir.display()))?;
        Ok(Self::open(data_dir.join("dynasty.db"))?)
    }

    pub fn open_memory() -> StoreResult<Self> {
        tracing::debug!("opening in-memory database");
        Self::from_connection(Connection::open_in_memory()?)
    }

    /// Opens from a connection string: `:memory:`, `sqlite://<path>`, a bare
    /// path, or empty for the default location.
    pub fn open_url(url: &str) -> anyhow::Result<Self> {
        let url = url.trim();
        match url {
            "" => Self::open_default(),
            ":memory:" | "sqlite::memory:" => Ok(Self::open_memory()?),
            _ => {
                let path = url.strip_prefix("sqlite://").unwrap_or(url);
                if let Some(parent) = Path::new(path).parent().filter(|p| !p.as_os_str().is_empty()) {
                    std::fs::create_dir_all(parent)
                        .with_context(|| format!("failed to create {}", parent.display()))?;
                }
                Ok(Self::open(path)?)
            }
        }
    }

    fn from_connection(conn: Connection) -> StoreResult<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.busy_timeout(Duration::from_secs(5))?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Applies the schema. Safe to run on every start.
    pub fn migrate(&self) -> StoreResult<()> {
        self.with_connection(|conn| {
            conn.execute_batch(schema::SCHEMA)?;
            Ok::<_, StoreError>(())
        })?;
        tracing::info!("database schema ready");
        Ok(())
    }

    /// Runs `f` with exclusive access to the connection.
    pub fn with_connection<T, E>(&self, f: impl FnOnce(&mut Connection) -> Result<T, E>) -> Result<T, E>
    where
        E: From<StoreError>,
    {
        let mut guard = self
            .conn
            .lock()
            .map_err(|_| StoreError::Unavailable("connection lock poisoned".into()))?;
        f(&mut guard)
    }

    /// Runs `f` inside a transaction that commits only if `f` succeeds.
    pub fn transaction<T>(&self, f: impl FnOnce(&Transaction<'_>) -> StoreResult<T>) -> StoreResult<T> {
        self.with_connection(|conn| {
            let tx = conn.transaction()?;
            let value = f(&tx)?;
            tx.commit()?;
            Ok(value)
        })
    }

    /// Round-trips a trivial query; used for readiness checks.
    pub fn ping(&self) -> StoreResult<()> {
        self.with_connection(|conn| {
            conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?;
            Ok(())
        })
    }

    /// Closes the connection if this is the last handle; otherwise just drops it.
    pub fn close(self) -> StoreResult<()> {
        match Arc::try_unwrap(self.conn) {
            Ok(mutex) => {
                let conn = mutex
                    .into_inner()
                    .map_err(|_| StoreError::Unavailable("connection lock poisoned".into()))?;
                conn.close().map_err(|(_, err)| StoreError::from(err))?;
                tracing::info!("database closed");
                Ok(())
            }
            Err(shared) => {
                tracing::debug!(handles = Arc::strong_count(&shared) - 1, "database still shared; releasing handle");
                Ok(())
            }
        }
    }
}
