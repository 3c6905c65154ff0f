use std::path::Path;

use duckdb::Connection;
use log::info;

/// Open (creating if absent) the persistent database file and make sure the
/// extensions the scripts rely on are installed and loaded: `parquet` for
/// the columnar data file, `httpfs` for scripts that read remote files.
///
/// Extension failures are not caught here; the caller decides what a failed
/// bootstrap means for the run.  The returned connection is meant to serve
/// exactly one pipeline run and be closed by its owner.
pub fn connect(db_path: &Path) -> Result<Connection, duckdb::Error> {
    let conn = Connection::open(db_path)?;
    conn.execute_batch("INSTALL parquet; LOAD parquet;")?;
    conn.execute_batch("INSTALL httpfs; LOAD httpfs;")?;
    info!("connected to {}", db_path.display());
    Ok(conn)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creates_database_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sales.duckdb");
        let conn = connect(&path).unwrap();
        conn.execute_batch("CREATE TABLE t (x INTEGER);").unwrap();
        drop(conn);
        assert!(path.exists());

        // reopens cleanly after the first connection is gone
        let conn = connect(&path).unwrap();
        let n: i64 = conn
            .query_row("SELECT COUNT(*) FROM t", [], |row| row.get(0))
            .unwrap();
        assert_eq!(n, 0);
    }
}
