//! DB2 dialect.

use super::helpers;
use super::SqlDialect;

/// DB2 dialect.
#[derive(Debug, Clone, Copy)]
pub struct Db2;

impl SqlDialect for Db2 {
    fn name(&self) -> &'static str {
        "db2"
    }

    fn paginate(&self, sql: &str, limit: u64, offset: u64) -> String {
        helpers::offset_fetch(sql, limit, offset)
    }

    fn next_sequence_value(&self, sequence: &str) -> String {
        format!("VALUES NEXT VALUE FOR {}", sequence)
    }
}
