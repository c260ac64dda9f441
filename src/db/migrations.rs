// Database migrations
use rusqlite::Connection;
use anyhow::Result;

use super::schema::TABLES;

pub fn run_migrations(conn: &mut Connection) -> Result<()> {
    // Enable foreign keys
    conn.execute("PRAGMA foreign_keys = ON", [])?;

    let tx = conn.transaction()?;

    // Create tables, then their indexes
    for table in TABLES {
        tx.execute(&table.create_sql(), [])?;
        for index in table.index_sql() {
            tx.execute(&index, [])?;
        }
        tracing::debug!(table = table.name, "ensured table");
    }

    tx.commit()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::schema::{DATA_POINTS, EXPERIMENTS, SUBJECTS, SUBJECT_EXPERIMENT};

    fn table_count(conn: &Connection) -> i64 {
        conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table'",
            [],
            |row| row.get(0),
        )
        .unwrap()
    }

    #[test]
    fn test_creates_all_tables() {
        let mut conn = Connection::open_in_memory().unwrap();
        run_migrations(&mut conn).unwrap();

        for name in [EXPERIMENTS, DATA_POINTS, SUBJECTS, SUBJECT_EXPERIMENT] {
            let exists: bool = conn
                .query_row(
                    "SELECT COUNT(*) > 0 FROM sqlite_master WHERE type = 'table' AND name = ?1",
                    [name],
                    |row| row.get(0),
                )
                .unwrap();
            assert!(exists, "missing table {}", name);
        }
        assert_eq!(table_count(&conn), 4);
    }

    #[test]
    fn test_migrations_are_idempotent() {
        let mut conn = Connection::open_in_memory().unwrap();
        run_migrations(&mut conn).unwrap();
        conn.execute("INSERT INTO experiments (title, type) VALUES ('kept', 1)", [])
            .unwrap();

        run_migrations(&mut conn).unwrap();

        assert_eq!(table_count(&conn), 4);
        let experiments: i64 = conn
            .query_row("SELECT COUNT(*) FROM experiments", [], |row| row.get(0))
            .unwrap();
        assert_eq!(experiments, 1);
    }

    #[test]
    fn test_foreign_keys_enabled() {
        let mut conn = Connection::open_in_memory().unwrap();
        run_migrations(&mut conn).unwrap();
        let enabled: i64 = conn
            .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
            .unwrap();
        assert_eq!(enabled, 1);
    }
}
