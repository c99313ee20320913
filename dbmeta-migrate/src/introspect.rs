//! Database metadata read back for script export.
//!
//! An [`Introspector`] reads the objects of a live database into a
//! [`DbMetadata`] value, which [`ScriptWriter`](crate::sql::ScriptWriter)
//! serializes into ordered scripts.

use serde::{Deserialize, Serialize};

use crate::error::MigrateResult;

/// Everything exported from a database.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DbMetadata {
    /// User-defined domains.
    pub domains: Vec<DomainInfo>,
    /// User tables.
    pub tables: Vec<TableInfo>,
    /// Stored procedures.
    pub procedures: Vec<ProcedureInfo>,
}

impl DbMetadata {
    /// Whether nothing was found.
    pub fn is_empty(&self) -> bool {
        self.domains.is_empty() && self.tables.is_empty() && self.procedures.is_empty()
    }
}

/// A user-defined domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainInfo {
    /// Domain name.
    pub name: String,
    /// Rendered SQL type, e.g. `VARCHAR(40)`.
    pub type_sql: String,
    /// Whether the domain carries `NOT NULL`.
    pub not_null: bool,
}

/// A user table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableInfo {
    /// Table name.
    pub name: String,
    /// Columns in declaration order.
    pub columns: Vec<ColumnInfo>,
    /// Primary key, if any.
    pub primary_key: Option<PrimaryKeyInfo>,
}

/// A table column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnInfo {
    /// Column name.
    pub name: String,
    /// Domain name or rendered SQL type.
    pub type_or_domain: String,
    /// Whether the column is `NOT NULL`.
    pub not_null: bool,
}

/// A primary key constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrimaryKeyInfo {
    /// Constraint name.
    pub constraint_name: String,
    /// Key columns in key order.
    pub columns: Vec<String>,
}

/// A stored procedure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcedureInfo {
    /// Procedure name.
    pub name: String,
    /// Input parameters.
    pub inputs: Vec<ParameterInfo>,
    /// Output parameters.
    pub outputs: Vec<ParameterInfo>,
    /// Source text following `AS`.
    pub body: String,
}

/// A procedure parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterInfo {
    /// Parameter name.
    pub name: String,
    /// Rendered SQL type.
    pub type_sql: String,
}

impl ParameterInfo {
    /// Create a parameter.
    pub fn new(name: impl Into<String>, type_sql: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_sql: type_sql.into(),
        }
    }
}

/// Reads database metadata.
pub trait Introspector {
    /// Read user-defined domains.
    fn read_domains(&mut self) -> MigrateResult<Vec<DomainInfo>>;

    /// Read user tables with their columns and primary keys.
    fn read_tables(&mut self) -> MigrateResult<Vec<TableInfo>>;

    /// Read stored procedures.
    fn read_procedures(&mut self) -> MigrateResult<Vec<ProcedureInfo>>;

    /// Read everything.
    fn read_all(&mut self) -> MigrateResult<DbMetadata> {
        Ok(DbMetadata {
            domains: self.read_domains()?,
            tables: self.read_tables()?,
            procedures: self.read_procedures()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MigrationError;

    struct Fixed {
        fail_tables: bool,
    }

    impl Introspector for Fixed {
        fn read_domains(&mut self) -> MigrateResult<Vec<DomainInfo>> {
            Ok(vec![DomainInfo {
                name: "D_ID".into(),
                type_sql: "INTEGER".into(),
                not_null: true,
            }])
        }

        fn read_tables(&mut self) -> MigrateResult<Vec<TableInfo>> {
            if self.fail_tables {
                return Err(MigrationError::introspection("cannot read tables"));
            }
            Ok(Vec::new())
        }

        fn read_procedures(&mut self) -> MigrateResult<Vec<ProcedureInfo>> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn test_read_all() {
        let metadata = Fixed { fail_tables: false }.read_all().unwrap();
        assert_eq!(metadata.domains.len(), 1);
        assert!(metadata.tables.is_empty());
        assert!(!metadata.is_empty());
    }

    #[test]
    fn test_read_all_propagates_errors() {
        let err = Fixed { fail_tables: true }.read_all().unwrap_err();
        assert!(matches!(err, MigrationError::Introspection(_)));
    }
}
