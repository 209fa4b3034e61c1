use std::path::{Path, PathBuf};

use rusqlite::Connection;
use tracing::debug;

use crate::error::{Error, Result};

use super::migrations;

pub const REMARK_DIR: &str = ".remark";
const DB_FILE: &str = "comments.db";

/// Database handle for comment storage
#[derive(Debug)]
pub struct RemarkDb {
    conn: Connection,
    dir: PathBuf,
}

impl RemarkDb {
    /// Initialize a new repository at the given path.
    /// Creates `.remark/` and the migrated database inside it.
    pub fn init(path: &Path) -> Result<Self> {
        let dir = path.join(REMARK_DIR);

        if dir.exists() {
            return Err(Error::AlreadyInitialized);
        }

        std::fs::create_dir_all(&dir)?;

        let conn = connect(&dir.join(DB_FILE))?;
        migrations::run_migrations(&conn)?;

        Ok(Self { conn, dir })
    }

    /// Open database, searching up from cwd for `.remark/`
    pub fn open() -> Result<Self> {
        let dir = find_remark_dir()?;
        Self::open_at(&dir)
    }

    /// Open database at a specific `.remark/` directory path
    pub fn open_at(dir: &Path) -> Result<Self> {
        let db_path = dir.join(DB_FILE);
        if !db_path.exists() {
            return Err(Error::NotARepository);
        }

        let conn = connect(&db_path)?;
        migrations::run_migrations(&conn)?;

        Ok(Self {
            conn,
            dir: dir.to_path_buf(),
        })
    }

    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// The `.remark/` directory this database lives in
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

fn connect(db_path: &Path) -> Result<Connection> {
    debug!(path = %db_path.display(), "opening comment database");
    let conn = Connection::open(db_path)?;
    conn.execute("PRAGMA foreign_keys = ON", [])?;
    Ok(conn)
}

/// Walk up from current directory looking for `.remark/`
pub fn find_remark_dir() -> Result<PathBuf> {
    let cwd = std::env::current_dir()?;
    find_remark_dir_from(&cwd)
}

/// Find `.remark/` starting from a specific path
pub fn find_remark_dir_from(start: &Path) -> Result<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(REMARK_DIR))
        .find(|candidate| candidate.is_dir())
        .ok_or(Error::NotARepository)
}
