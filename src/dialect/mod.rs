//! Vendor pagination, sequence and rewrite strategies.
//!
//! Each vendor implements `SqlDialect` as a stateless unit struct; the
//! [`Dialect`] enum selects one from configuration and delegates to it.
//!
//! | Vendor | Pagination | Next sequence value | Rewrites |
//! |--------|------------|---------------------|----------|
//! | PostgreSQL | `limit L offset O` | `SELECT nextval('seq')` | none |
//! | SQL Server | `offset O rows fetch next L rows only` | `SELECT NEXT VALUE FOR seq` | `\|\|`, `count(*)`, `::date` |
//! | Oracle | `rownum` wrapper | `SELECT seq.nextval FROM dual` | none |
//! | DB2 | `OFFSET O ROWS FETCH NEXT L ROWS ONLY` | `VALUES NEXT VALUE FOR seq` | none |
//!
//! # Usage
//!
//! ```rust
//! use querymap::dialect::{Dialect, SqlDialect};
//!
//! let dialect: Dialect = "postgres".parse().unwrap();
//! assert_eq!(dialect.paginate("SELECT * FROM t", 10, 20), "SELECT * FROM t limit 10 offset 20");
//! ```

mod db2;
pub mod helpers;
mod oracle;
mod postgres;
mod sqlserver;

pub use db2::Db2;
pub use oracle::Oracle;
pub use postgres::Postgres;
pub use sqlserver::SqlServer;

use std::str::FromStr;

use serde::{Deserialize, Deserializer};

use crate::error::DataError;

/// SQL dialect trait: how a finished statement is adapted to one vendor.
pub trait SqlDialect: std::fmt::Debug + Send + Sync {
    /// Dialect name for display/logging.
    fn name(&self) -> &'static str;

    /// Wrap `sql` so that it returns at most `limit` rows after skipping `offset`.
    fn paginate(&self, sql: &str, limit: u64, offset: u64) -> String;

    /// Statement returning the next value of `sequence`.
    fn next_sequence_value(&self, sequence: &str) -> String;

    /// Rewrite fragments the vendor does not understand.
    ///
    /// The builder renders PostgreSQL-flavoured predicates (`||`, `::date`);
    /// the default keeps the statement as is.
    fn prepare_sql(&self, sql: &str) -> String {
        sql.to_string()
    }
}

/// Supported SQL dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Dialect {
    #[default]
    Postgres,
    SqlServer,
    Oracle,
    Db2,
}

impl Dialect {
    /// Get the dialect implementation.
    pub fn dialect(&self) -> &'static dyn SqlDialect {
        match self {
            Dialect::Postgres => &Postgres,
            Dialect::SqlServer => &SqlServer,
            Dialect::Oracle => &Oracle,
            Dialect::Db2 => &Db2,
        }
    }
}

// Implement SqlDialect for Dialect enum by delegating to concrete types
impl SqlDialect for Dialect {
    fn name(&self) -> &'static str {
        self.dialect().name()
    }

    fn paginate(&self, sql: &str, limit: u64, offset: u64) -> String {
        self.dialect().paginate(sql, limit, offset)
    }

    fn next_sequence_value(&self, sequence: &str) -> String {
        self.dialect().next_sequence_value(sequence)
    }

    fn prepare_sql(&self, sql: &str) -> String {
        self.dialect().prepare_sql(sql)
    }
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.dialect().name())
    }
}

impl FromStr for Dialect {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(Dialect::Postgres),
            "sqlserver" | "mssql" | "tsql" => Ok(Dialect::SqlServer),
            "oracle" => Ok(Dialect::Oracle),
            "db2" => Ok(Dialect::Db2),
            other => Err(DataError::config(format!("unsupported dialect: {}", other))),
        }
    }
}

impl<'de> Deserialize<'de> for Dialect {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(serde::de::Error::custom)
    }
}
