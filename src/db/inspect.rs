// Live database inspection: tables, columns and foreign keys as SQLite reports them
use rusqlite::Connection;

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnInfo {
    pub name: String,
    pub sql_type: String,
    pub primary_key: bool,
    pub default: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForeignKeyInfo {
    pub constrained_columns: Vec<String>,
    pub referred_table: String,
    pub referred_columns: Vec<String>,
}

/// User tables, sorted by name
pub fn table_names(conn: &Connection) -> Result<Vec<String>, anyhow::Error> {
    let mut stmt = conn.prepare(
        "SELECT name FROM sqlite_master
         WHERE type = 'table' AND name NOT LIKE 'sqlite_%'
         ORDER BY name",
    )?;

    let names = stmt
        .query_map([], |row| row.get(0))?
        .collect::<Result<Vec<String>, _>>()?;

    Ok(names)
}

pub fn columns(conn: &Connection, table: &str) -> Result<Vec<ColumnInfo>, anyhow::Error> {
    let mut stmt = conn.prepare(
        "SELECT name, type, pk, dflt_value FROM pragma_table_info(?1) ORDER BY cid",
    )?;

    let columns = stmt
        .query_map([table], |row| {
            Ok(ColumnInfo {
                name: row.get(0)?,
                sql_type: row.get(1)?,
                primary_key: row.get::<_, i64>(2)? > 0,
                default: row.get(3)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(columns)
}

/// Foreign keys of a table, one entry per constraint
pub fn foreign_keys(conn: &Connection, table: &str) -> Result<Vec<ForeignKeyInfo>, anyhow::Error> {
    let mut stmt = conn.prepare(
        "SELECT id, \"table\", \"from\", \"to\" FROM pragma_foreign_key_list(?1) ORDER BY id, seq",
    )?;

    let rows = stmt
        .query_map([table], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, Option<String>>(3)?,
            ))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    // Composite constraints span several rows sharing an id
    let mut keys: Vec<(i64, ForeignKeyInfo)> = Vec::new();
    for (id, referred_table, from, to) in rows {
        let to = to.unwrap_or_else(|| "id".to_string());
        match keys.last_mut() {
            Some((last_id, key)) if *last_id == id => {
                key.constrained_columns.push(from);
                key.referred_columns.push(to);
            }
            _ => keys.push((
                id,
                ForeignKeyInfo {
                    constrained_columns: vec![from],
                    referred_table,
                    referred_columns: vec![to],
                },
            )),
        }
    }

    Ok(keys.into_iter().map(|(_, key)| key).collect())
}
