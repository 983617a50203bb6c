#[path = "../common/mod.rs"]
mod common;

use chrono::NaiveDate;
use insta::assert_snapshot;
use querymap::dialect::{Dialect, SqlDialect};
use querymap::query::{Comparator, QueryBuilder, SortOrder};
use sqlparser::dialect::{GenericDialect, MsSqlDialect, PostgreSqlDialect};
use sqlparser::parser::Parser;

fn validate_sql(sql: &str, dialect: Dialect) {
    let parser_dialect: Box<dyn sqlparser::dialect::Dialect> = match dialect {
        Dialect::Postgres => Box::new(PostgreSqlDialect {}),
        Dialect::SqlServer => Box::new(MsSqlDialect {}),
        Dialect::Oracle | Dialect::Db2 => Box::new(GenericDialect {}),
    };
    if let Err(e) = Parser::parse_sql(&*parser_dialect, sql) {
        panic!("invalid SQL for {}: {}\nSQL: {}", dialect, e, sql);
    }
}

fn sorted_customers() -> QueryBuilder {
    let mut query = QueryBuilder::for_entity(&common::cache(), "Customer", true).unwrap();
    query.set_order_by("id", SortOrder::Ascending);
    query
}

#[test]
fn test_paginated_projection_parses() {
    let sql = sorted_customers().sql();
    for dialect in [Dialect::Postgres, Dialect::SqlServer, Dialect::Db2] {
        let paged = dialect.paginate(&dialect.prepare_sql(&sql), 10, 20);
        validate_sql(&paged, dialect);
    }
}

#[test]
fn test_pagination_suffixes() {
    let sql = "SELECT * FROM tbl_customer t1 ORDER BY t1.pk_customer ASC";

    assert_snapshot!(
        Dialect::Postgres.paginate(sql, 10, 20),
        @"SELECT * FROM tbl_customer t1 ORDER BY t1.pk_customer ASC limit 10 offset 20"
    );
    assert_snapshot!(
        Dialect::SqlServer.paginate(sql, 10, 0),
        @"SELECT * FROM tbl_customer t1 ORDER BY t1.pk_customer ASC offset 0 rows fetch next 10 rows only"
    );
    assert_snapshot!(
        Dialect::Db2.paginate(sql, 10, 0),
        @"SELECT * FROM tbl_customer t1 ORDER BY t1.pk_customer ASC FETCH NEXT 10 ROWS ONLY"
    );
    assert_snapshot!(
        Dialect::Oracle.paginate(sql, 10, 20),
        @"SELECT * FROM (SELECT page.*, rownum rn FROM(SELECT * FROM tbl_customer t1 ORDER BY t1.pk_customer ASC) page ) WHERE rn<= 30 AND rn > 20"
    );
}

#[test]
fn test_sqlserver_rewrites_builder_output() {
    let day = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
    let mut query = QueryBuilder::new("SELECT * FROM tbl_customer");
    query
        .add_condition("cst_birth_date", day, Comparator::LessThan)
        .add_condition_like("cst_name", "ann");

    assert_snapshot!(
        Dialect::SqlServer.prepare_sql(&query.sql_count().unwrap()),
        @"SELECT count_big(*) FROM tbl_customer WHERE CAST(cst_birth_date as date)<:cst_birth_date_0 AND UPPER(cst_name) LIKE '%'+:cst_name_1+'%'"
    );
    assert_eq!(
        Dialect::Postgres.prepare_sql(&query.sql()),
        query.sql(),
    );
}

#[test]
fn test_dialect_names_round_trip() {
    for dialect in [Dialect::Postgres, Dialect::SqlServer, Dialect::Oracle, Dialect::Db2] {
        assert_eq!(dialect.to_string().parse::<Dialect>().unwrap(), dialect);
        assert_eq!(dialect.name(), dialect.dialect().name());
    }
}
