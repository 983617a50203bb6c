//! PostgreSQL SQL dialect.
//!
//! The builder already renders PostgreSQL syntax, so no rewrite is needed.

use super::helpers;
use super::SqlDialect;

/// PostgreSQL SQL dialect.
#[derive(Debug, Clone, Copy)]
pub struct Postgres;

impl SqlDialect for Postgres {
    fn name(&self) -> &'static str {
        "postgres"
    }

    fn paginate(&self, sql: &str, limit: u64, offset: u64) -> String {
        helpers::limit_offset(sql, limit, offset)
    }

    fn next_sequence_value(&self, sequence: &str) -> String {
        format!("SELECT nextval('{}')", sequence)
    }
}
