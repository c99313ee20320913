//! Metadata introspection for SQLite databases.

use dbmeta_migrate::{
    ColumnInfo, DomainInfo, Introspector, MigrateResult, MigrationError, PrimaryKeyInfo,
    ProcedureInfo, TableInfo,
};
use rusqlite::Connection;
use tracing::debug;

use crate::connection::SqliteSession;

const TABLES_SQL: &str = "SELECT name FROM sqlite_master \
     WHERE type = 'table' AND name NOT LIKE 'sqlite_%' \
     ORDER BY name";

const COLUMNS_SQL: &str = "SELECT name, type, \"notnull\", pk FROM pragma_table_info(?1) ORDER BY cid";

/// Name given to exported primary key constraints.
pub fn primary_key_name(table: &str) -> String {
    format!("PK_{table}")
}

struct ColumnRow {
    info: ColumnInfo,
    pk_position: i64,
}

fn read_table(conn: &Connection, name: &str) -> rusqlite::Result<TableInfo> {
    let mut stmt = conn.prepare(COLUMNS_SQL)?;
    let rows = stmt
        .query_map([name], |row| {
            Ok(ColumnRow {
                info: ColumnInfo {
                    name: row.get(0)?,
                    type_or_domain: row.get(1)?,
                    not_null: row.get::<_, i64>(2)? != 0,
                },
                pk_position: row.get(3)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    let mut key: Vec<(i64, String)> = rows
        .iter()
        .filter(|c| c.pk_position > 0)
        .map(|c| (c.pk_position, c.info.name.clone()))
        .collect();
    key.sort();

    let primary_key = (!key.is_empty()).then(|| PrimaryKeyInfo {
        constraint_name: primary_key_name(name),
        columns: key.into_iter().map(|(_, column)| column).collect(),
    });

    Ok(TableInfo {
        name: name.to_string(),
        columns: rows.into_iter().map(|c| c.info).collect(),
        primary_key,
    })
}

fn read_tables(conn: &Connection) -> rusqlite::Result<Vec<TableInfo>> {
    let mut stmt = conn.prepare(TABLES_SQL)?;
    let names = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    names.iter().map(|name| read_table(conn, name)).collect()
}

impl Introspector for SqliteSession {
    /// SQLite has no domains.
    fn read_domains(&mut self) -> MigrateResult<Vec<DomainInfo>> {
        Ok(Vec::new())
    }

    fn read_tables(&mut self) -> MigrateResult<Vec<TableInfo>> {
        let tables = read_tables(self.connection())
            .map_err(|e| MigrationError::introspection(e.to_string()))?;
        debug!(count = tables.len(), "Read tables");
        Ok(tables)
    }

    /// SQLite has no stored procedures.
    fn read_procedures(&mut self) -> MigrateResult<Vec<ProcedureInfo>> {
        Ok(Vec::new())
    }
}
