//! Shared helper functions for SQL dialect implementations.

use std::sync::LazyLock;

use regex::Regex;

// =============================================================================
// Pagination
// =============================================================================

/// `LIMIT`-style suffix, lowercase as PostgreSQL accepts it.
/// Used by: Postgres
pub fn limit_offset(sql: &str, limit: u64, offset: u64) -> String {
    let mut out = format!("{} limit {}", sql, limit);
    if offset > 0 {
        out.push_str(&format!(" offset {}", offset));
    }
    out
}

/// ANSI `OFFSET ... FETCH NEXT ...`, offset omitted when zero.
/// Used by: DB2
pub fn offset_fetch(sql: &str, limit: u64, offset: u64) -> String {
    let mut out = sql.to_string();
    if offset > 0 {
        out.push_str(&format!(" OFFSET {} ROWS", offset));
    }
    out.push_str(&format!(" FETCH NEXT {} ROWS ONLY", limit));
    out
}

// =============================================================================
// Rewrites
// =============================================================================

static COUNT_STAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)count\(\s*\*\s*\)").expect("count(*) pattern is valid")
});

static DATE_CAST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([.\w-]+)::date").expect("date cast pattern is valid")
});

/// Replace the `||` concatenation operator with `+`.
pub fn concat_with_plus(sql: &str) -> String {
    sql.replace("||", "+")
}

/// Replace `count(*)` in any case or spacing with `count_big(*)`.
pub fn count_big(sql: &str) -> String {
    COUNT_STAR.replace_all(sql, "count_big(*)").into_owned()
}

/// Replace `expr::date` casts with `CAST(expr as date)`.
pub fn cast_date(sql: &str) -> String {
    DATE_CAST.replace_all(sql, "CAST($1 as date)").into_owned()
}
