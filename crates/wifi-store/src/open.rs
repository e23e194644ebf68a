use crate::schema::{DATABASE_VERSION, MIG_0001_INIT};
use anyhow::Result;
use inetify_core::StoreError;
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::debug;

/// SQLite database holding the ignore list and Wifi locations.
///
/// The connection is opened on first use and dropped by `close`. All access
/// goes through one mutex, so there is a single reader or writer at a time.
pub struct Db {
    path: PathBuf,
    conn: Mutex<Option<Connection>>,
}

impl Db {
    /// Creates a handle without touching the file.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Db { path: path.as_ref().to_path_buf(), conn: Mutex::new(None) }
    }

    pub(crate) fn with_conn<T>(&self, f: impl FnOnce(&Connection) -> Result<T>) -> Result<T, StoreError> {
        let mut guard = self.conn.lock().map_err(|_| StoreError::Poisoned)?;
        if guard.is_none() {
            debug!("opening database {}", self.path.display());
            let conn = open_connection(&self.path).map_err(StoreError::backend)?;
            *guard = Some(conn);
        }
        match guard.as_ref() {
            Some(conn) => f(conn).map_err(StoreError::backend),
            None => Err(StoreError::backend("database connection missing after open")),
        }
    }

    pub(crate) fn close_conn(&self) {
        let conn = match self.conn.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        if let Some(conn) = conn {
            debug!("closing database {}", self.path.display());
            if let Err((_, e)) = conn.close() {
                tracing::warn!("error closing database: {e}");
            }
        }
    }

    pub(crate) fn conn_is_open(&self) -> bool {
        match self.conn.lock() {
            Ok(guard) => guard.is_some(),
            Err(poisoned) => poisoned.into_inner().is_some(),
        }
    }
}

fn open_connection(path: &Path) -> Result<Connection> {
    let conn = Connection::open(path)?;
    apply_pragmas(&conn)?;
    migrate(&conn)?;
    Ok(conn)
}

fn apply_pragmas(conn: &Connection) -> Result<()> {
    conn.pragma_update(None, "journal_mode", &"WAL")?;
    conn.pragma_update(None, "synchronous", &"NORMAL")?;
    conn.busy_timeout(std::time::Duration::from_secs(2))?;
    Ok(())
}

fn migrate(conn: &Connection) -> Result<()> {
    let version: i64 = conn.query_row("PRAGMA user_version", [], |r| r.get(0))?;
    match version {
        0 => conn.execute_batch(MIG_0001_INIT)?,
        DATABASE_VERSION => {}
        _ => anyhow::bail!("unsupported database version {version}, expected {DATABASE_VERSION}"),
    }
    Ok(())
}
