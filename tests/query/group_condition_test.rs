#[path = "../common/mod.rs"]
mod common;

use chrono::NaiveDate;
use insta::assert_snapshot;
use querymap::error::DataError;
use querymap::query::{Comparator, Condition, DataType, GroupCondition, MatchMode, QueryBuilder};
use querymap::value::Value;

fn customers() -> QueryBuilder {
    QueryBuilder::for_entity(&common::cache(), "Customer", false).unwrap()
}

fn strip_base(sql: &str) -> &str {
    sql.split_once(" WHERE ").map(|(_, rest)| rest).unwrap_or("")
}

#[test]
fn test_groups_are_ored_and_anded_with_prior_conditions() {
    let born = NaiveDate::from_ymd_opt(1990, 6, 1).unwrap();
    let groups = vec![
        GroupCondition::new()
            .with(Condition::new("name", "ann", DataType::Alphanumeric, MatchMode::TextStartsWith))
            .with(Condition::new("birthDate", born, DataType::Date, MatchMode::GreaterOrEqual)),
        GroupCondition::from(vec![Condition::new(
            "address.city",
            "paris",
            DataType::Alphanumeric,
            MatchMode::Equal,
        )]),
    ];

    let mut query = customers();
    query.add_condition("id", 10, Comparator::GreaterThan);
    query.add_group_conditions(&groups).unwrap();

    assert_snapshot!(
        strip_base(&query.sql()),
        @"t1.pk_customer>:t1.pk_customer_0 AND ((UPPER(t1.cst_name) LIKE :t1.cst_name_1||'%' AND t1.cst_birth_date::date>=:t1.cst_birth_date_2) OR (UPPER(t1.cst_city)=:t1.cst_city_3))"
    );
    assert_eq!(query.params().len(), 4);
}

#[test]
fn test_alternatives_render_as_or_group() {
    let condition = Condition::new("name", "ann", DataType::Alphanumeric, MatchMode::TextContains)
        .or(Condition::new("address.street", "ann", DataType::Alphanumeric, MatchMode::TextContains));
    let mut query = customers();
    query
        .add_group_condition(&GroupCondition::new().with(condition))
        .unwrap();

    assert_snapshot!(
        strip_base(&query.sql()),
        @"(((UPPER(t1.cst_name) LIKE '%'||:t1.cst_name_0||'%' OR UPPER(t1.cst_street) LIKE '%'||:t1.cst_street_1||'%')))"
    );
}

#[test]
fn test_absent_values_drop_their_group() {
    let groups = vec![
        GroupCondition::new().with(Condition::new("name", "  ", DataType::Alphanumeric, MatchMode::Equal)),
        GroupCondition::new().with(Condition::new("id", 5, DataType::Numeric, MatchMode::Equal)),
    ];
    let mut query = customers();
    query.add_group_conditions(&groups).unwrap();
    assert_eq!(strip_base(&query.sql()), "((t1.pk_customer=:t1.pk_customer_0))");

    let mut query = customers();
    query
        .add_group_condition(&GroupCondition::new().with(Condition::new(
            "name",
            Value::Null,
            DataType::Alphanumeric,
            MatchMode::Equal,
        )))
        .unwrap();
    assert!(!query.sql().contains(" WHERE "));
}

#[test]
fn test_invalid_conditions_leave_builder_untouched() {
    let mut query = customers();
    query.add_condition("id", 1, Comparator::Equal);
    let before = query.sql();

    let mode_mismatch = GroupCondition::new()
        .with(Condition::new("id", 1, DataType::Numeric, MatchMode::Equal))
        .with(Condition::new("name", "x", DataType::Alphanumeric, MatchMode::Between));
    let err = query.add_group_condition(&mode_mismatch).unwrap_err();
    assert!(matches!(err, DataError::Configuration(_)));

    let not_a_date = GroupCondition::new().with(Condition::new(
        "birthDate",
        "yesterday",
        DataType::Date,
        MatchMode::LessThan,
    ));
    let err = query.add_group_condition(&not_a_date).unwrap_err();
    assert!(matches!(err, DataError::InvalidArgument(_)));

    let bad_between = GroupCondition::new().with(Condition::new(
        "id",
        Value::list([1]),
        DataType::Numeric,
        MatchMode::Between,
    ));
    let err = query.add_group_condition(&bad_between).unwrap_err();
    assert!(matches!(err, DataError::InvalidArgument(_)));

    assert_eq!(query.sql(), before);
    assert_eq!(query.params().len(), 1);
}
