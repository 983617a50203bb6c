//! SQL Server dialect.
//!
//! SQL Server features:
//! - `OFFSET ... ROWS FETCH NEXT ... ROWS ONLY` pagination (offset always present)
//! - `+` for string concatenation
//! - `count_big(*)` to avoid int overflow on large tables
//! - `CAST(x as date)` instead of `x::date`

use super::helpers;
use super::SqlDialect;

/// SQL Server dialect.
#[derive(Debug, Clone, Copy)]
pub struct SqlServer;

impl SqlDialect for SqlServer {
    fn name(&self) -> &'static str {
        "sqlserver"
    }

    fn paginate(&self, sql: &str, limit: u64, offset: u64) -> String {
        format!("{} offset {} rows fetch next {} rows only", sql, offset, limit)
    }

    fn next_sequence_value(&self, sequence: &str) -> String {
        format!("SELECT NEXT VALUE FOR {}", sequence)
    }

    fn prepare_sql(&self, sql: &str) -> String {
        let sql = helpers::concat_with_plus(sql);
        let sql = helpers::count_big(&sql);
        helpers::cast_date(&sql)
    }
}
