use std::path::Path;

use rusqlite::Connection;
use serde::Serialize;

pub mod load;
pub mod query;
pub mod schema;

use crate::error::{CohortError, Result};

pub const DEFAULT_DB_NAME: &str = "immune_cells.db";
pub const DEFAULT_CSV_NAME: &str = "cell-count.csv";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LoadSummary {
    pub subjects: usize,
    pub samples: usize,
    pub cell_counts: usize,
}

pub fn open_db(path: &Path) -> Result<Connection> {
    let conn = Connection::open(path)?;
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    Ok(conn)
}

/// Opens a database that a previous `load` created.
pub fn open_existing_db(path: &Path) -> Result<Connection> {
    if !path.exists() {
        return Err(CohortError::MissingInput(format!(
            "database {} not found; run `load` first",
            path.display()
        )));
    }
    open_db(path)
}

#[cfg(test)]
pub fn open_in_memory() -> Result<Connection> {
    let conn = Connection::open_in_memory()?;
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    Ok(conn)
}

#[cfg(test)]
#[path = "../../tests/src_inline/store/tests.rs"]
mod tests;
