//! Oracle dialect.
//!
//! Pagination wraps the statement in a `rownum` subquery, which works on every
//! Oracle release including those without `FETCH FIRST`.

use super::SqlDialect;

/// Oracle dialect.
#[derive(Debug, Clone, Copy)]
pub struct Oracle;

impl SqlDialect for Oracle {
    fn name(&self) -> &'static str {
        "oracle"
    }

    fn paginate(&self, sql: &str, limit: u64, offset: u64) -> String {
        let mut out = format!(
            "SELECT * FROM (SELECT page.*, rownum rn FROM({}) page ) WHERE rn<= {}",
            sql,
            limit + offset
        );
        if offset > 0 {
            out.push_str(&format!(" AND rn > {}", offset));
        }
        out
    }

    fn next_sequence_value(&self, sequence: &str) -> String {
        format!("SELECT {}.nextval FROM dual", sequence)
    }
}
