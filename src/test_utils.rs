//! Test utilities: sqlparser validation and shared descriptor fixtures.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlparser::dialect::{GenericDialect, MsSqlDialect, PostgreSqlDialect};
use sqlparser::parser::Parser;

use crate::dialect::Dialect;
use crate::mapper::Row;
use crate::metadata::{
    ColumnDescriptor, ConverterKind, EntityDescriptor, EntityRegistry, EnumMapping, FieldType,
    JoinDescriptor,
};
use crate::value::Value;

/// Validates that a SQL string is syntactically valid for the given dialect.
pub fn validate_sql(sql: &str, dialect: Dialect) -> Result<(), String> {
    let parser_dialect: Box<dyn sqlparser::dialect::Dialect> = match dialect {
        Dialect::Postgres => Box::new(PostgreSqlDialect {}),
        Dialect::SqlServer => Box::new(MsSqlDialect {}),
        Dialect::Oracle | Dialect::Db2 => Box::new(GenericDialect {}),
    };

    Parser::parse_sql(&*parser_dialect, sql)
        .map(|_| ())
        .map_err(|e| format!("Invalid SQL for {:?}: {}\nSQL: {}", dialect, e, sql))
}

/// Registry with the `tmp_test_*` entities used across unit tests.
pub fn fixture_registry() -> EntityRegistry {
    let registry = EntityRegistry::new();
    registry
        .register_descriptor(
            EntityDescriptor::table("TestType", "tmp_test_type")
                .key("pk_test_type")
                .column(
                    "id",
                    ColumnDescriptor::new("pk_test_type").field_type(FieldType::Integer),
                )
                .column("name", ColumnDescriptor::new("name").alias("tt_name").length(10)),
        )
        .register_descriptor(
            EntityDescriptor::embedded("TestDataGroup")
                .column("text", ColumnDescriptor::new("td_text").length(100)),
        )
        .register_descriptor(
            EntityDescriptor::table("TestData", "tmp_test_data")
                .key("pk_test_data")
                .sequence("tmp_test_data_pk_test_data_seq")
                .column(
                    "id",
                    ColumnDescriptor::new("pk_test_data")
                        .serial()
                        .field_type(FieldType::Integer),
                )
                .column("systemId", ColumnDescriptor::new("td_system_id"))
                .column("loginId", ColumnDescriptor::new("td_login_id").length(10))
                .column("date", ColumnDescriptor::new("td_date"))
                .column(
                    "localDate",
                    ColumnDescriptor::new("td_local_date").field_type(FieldType::Date),
                )
                .column(
                    "localDateTime",
                    ColumnDescriptor::new("td_local_date_time").field_type(FieldType::DateTime),
                )
                .column(
                    "status",
                    ColumnDescriptor::new("td_status").converter(ConverterKind::EnumByName(
                        EnumMapping::new("Status").named("SUCCESS").named("ERROR"),
                    )),
                )
                .column(
                    "color",
                    ColumnDescriptor::new("td_color_id").converter(ConverterKind::EnumById(
                        EnumMapping::new("Color").variant("RED", 1).variant("BLACK", 2),
                    )),
                )
                .column(
                    "colors",
                    ColumnDescriptor::new("td_color_json").converter(ConverterKind::JsonList),
                )
                .column(
                    "json",
                    ColumnDescriptor::new("td_data_json").converter(ConverterKind::Json),
                )
                .column(
                    "jsonList",
                    ColumnDescriptor::new("td_list_json").converter(ConverterKind::JsonList),
                )
                .join("type", JoinDescriptor::new("TestType", "fk_test_type").lazy())
                .group("group", "TestDataGroup", true),
        )
        .register_descriptor(
            EntityDescriptor::view("TestViewData", "SELECT * FROM tmp_test_data")
                .column("id", ColumnDescriptor::new("pk_test_data"))
                .column("loginId", ColumnDescriptor::new("td_login_id"))
                .group("group", "TestDataGroup", true),
        )
        .register_descriptor(
            EntityDescriptor::table("TestDataEmpty", "tmp_test_data_empty")
                .key("pk_test_data_empty")
                .default_order_by("pk_test_data_empty")
                .column("id", ColumnDescriptor::new("pk_test_data_empty")),
        )
        .register_descriptor(
            EntityDescriptor::table("TestDataHistory", "tmp_test_data_history")
                .key("pk_test_data_history")
                .sequence("tmp_test_data_history_pk_test_data_history_seq")
                .column(
                    "testDataId",
                    ColumnDescriptor::new("fk_test_data").updatable(false),
                )
                .column("info", ColumnDescriptor::new("info")),
        );
    registry
}

/// A row as a driver would return it for the eager `TestData` projection.
pub fn fixture_row() -> Row {
    let day = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
    let noon = day.and_hms_opt(12, 30, 0).unwrap();
    [
        ("pk_test_data", Value::Decimal(Decimal::ONE)),
        ("td_system_id", Value::Int(10)),
        ("td_login_id", Value::from("jdoe")),
        ("td_date", Value::DateTime(noon)),
        ("td_local_date", Value::DateTime(day.and_hms_opt(0, 0, 0).unwrap())),
        ("td_local_date_time", Value::DateTime(noon)),
        ("td_status", Value::from("SUCCESS")),
        ("td_color_id", Value::from("2")),
        ("td_color_json", Value::from("[\"RED\",\"BLACK\"]")),
        ("td_data_json", Value::from("{\"id\":1,\"text\":\"a\",\"enabled\":true}")),
        ("td_list_json", Value::Null),
        ("td_text", Value::from("hello")),
        ("pk_test_type", Value::Int(7)),
        ("tt_name", Value::from("basic")),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_valid_sql() {
        validate_sql("SELECT * FROM users", Dialect::Postgres).unwrap();
        validate_sql("SELECT * FROM users", Dialect::SqlServer).unwrap();
        validate_sql("SELECT * FROM users", Dialect::Oracle).unwrap();
    }

    #[test]
    fn test_validate_invalid_sql() {
        let result = validate_sql("SELEC * FORM users", Dialect::Postgres);
        assert!(result.is_err());
    }

    #[test]
    fn test_fixture_registry_entities() {
        let registry = fixture_registry();
        assert_eq!(registry.len(), 6);
    }
}
