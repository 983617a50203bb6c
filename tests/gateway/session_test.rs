#[path = "../common/mod.rs"]
mod common;

use std::collections::VecDeque;
use std::sync::Mutex;

use querymap::config::Settings;
use querymap::error::{DataError, DataResult};
use querymap::gateway::{Session, StatementGateway};
use querymap::mapper::Row;
use querymap::query::{Comparator, QueryBuilder, SortOrder};
use querymap::value::{Params, Value};

/// Replays canned result sets and records every statement it receives.
#[derive(Default)]
struct RecordingGateway {
    results: Mutex<VecDeque<DataResult<Vec<Row>>>>,
    statements: Mutex<Vec<(String, Params)>>,
}

impl RecordingGateway {
    fn with_results(results: Vec<DataResult<Vec<Row>>>) -> Self {
        Self {
            results: Mutex::new(results.into()),
            ..Self::default()
        }
    }

    fn sql(&self) -> Vec<String> {
        self.statements
            .lock()
            .unwrap()
            .iter()
            .map(|(sql, _)| sql.clone())
            .collect()
    }
}

impl StatementGateway for RecordingGateway {
    fn query(&self, sql: &str, params: &Params) -> DataResult<Vec<Row>> {
        self.statements
            .lock()
            .unwrap()
            .push((sql.to_string(), params.clone()));
        self.results.lock().unwrap().pop_front().unwrap_or(Ok(Vec::new()))
    }

    fn execute(&self, sql: &str, params: &Params) -> DataResult<u64> {
        self.statements
            .lock()
            .unwrap()
            .push((sql.to_string(), params.clone()));
        Ok(1)
    }
}

fn invoice(id: i64, total: f64) -> Row {
    common::row(&[
        ("pk_invoice", Value::Int(id)),
        ("fk_customer", Value::Int(12)),
        ("inv_total", Value::Float(total)),
    ])
}

fn count(n: i64) -> Row {
    common::row(&[("count", Value::Int(n))])
}

#[test]
fn test_configured_session_pages_on_sqlserver() {
    let settings = Settings::from_toml_str(
        r#"
[engine]
dialect = "sqlserver"

[query]
uppercase_automatically = false
"#,
    )
    .unwrap();

    let gateway = RecordingGateway::with_results(vec![
        Ok(vec![count(3)]),
        Ok(vec![invoice(1, 10.5), invoice(2, 99.0)]),
    ]);
    let session = Session::new(gateway, common::cache(), settings.engine.dialect);

    let mut query = session
        .query_for("Invoice", false)
        .unwrap()
        .with_options(settings.builder_options());
    query
        .add_condition("customerId", 12, Comparator::Equal)
        .set_order_by("id", SortOrder::Ascending)
        .set_limit(2);

    let page = session.find_page(&mut query).unwrap();

    assert_eq!(page.total_count, 3);
    assert_eq!(page.records.len(), 2);
    assert_eq!(page.records[1].get("total"), Some(&Value::Float(99.0)));
    assert_eq!(
        session.gateway().sql(),
        vec![
            "SELECT count_big(*) FROM tbl_invoice t1 WHERE t1.fk_customer=:t1.fk_customer_0"
                .to_string(),
            "SELECT t1.pk_invoice, t1.fk_customer, t1.inv_total FROM tbl_invoice t1 WHERE t1.fk_customer=:t1.fk_customer_0 ORDER BY t1.pk_invoice ASC offset 0 rows fetch next 2 rows only"
                .to_string(),
        ]
    );
}

#[test]
fn test_gateway_errors_propagate() {
    let gateway = RecordingGateway::with_results(vec![Err(DataError::Gateway(
        "connection reset".to_string(),
    ))]);
    let session = Session::new(gateway, common::cache(), Default::default());
    let mut query = session.query_for("Invoice", false).unwrap();

    let err = session.find(&mut query).unwrap_err();
    assert!(matches!(err, DataError::Gateway(ref msg) if msg == "connection reset"));
}

#[test]
fn test_iterate_uses_default_order_and_stops_on_empty_page() {
    let gateway = RecordingGateway::with_results(vec![
        Ok(vec![common::row(&[
            ("pk_customer", Value::Int(1)),
            ("cst_name", Value::from("a")),
            ("cst_email", Value::Null),
            ("cst_birth_date", Value::Null),
            ("cst_status", Value::from("ACTIVE")),
            ("cst_street", Value::Null),
            ("cst_city", Value::Null),
        ])]),
        Ok(Vec::new()),
    ]);
    let session = Session::new(gateway, common::cache(), "db2".parse().unwrap());
    let mut query = session.query_for("Customer", false).unwrap();
    query.set_offset(5);

    let records: Vec<_> = session
        .iterate(&query, 50)
        .unwrap()
        .collect::<DataResult<Vec<_>>>()
        .unwrap()
        .into_iter()
        .flatten()
        .collect();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].get("email"), Some(&Value::Null));

    let sql = session.gateway().sql();
    assert_eq!(sql.len(), 2);
    assert!(sql[0].ends_with("ORDER BY pk_customer ASC OFFSET 5 ROWS FETCH NEXT 50 ROWS ONLY"));
    assert!(sql[1].ends_with("OFFSET 55 ROWS FETCH NEXT 50 ROWS ONLY"));
}

#[test]
fn test_delete_and_sequence() {
    let gateway = RecordingGateway::with_results(vec![Ok(vec![count(7)])]);
    let session = Session::new(gateway, common::cache(), Default::default());

    assert_eq!(session.next_sequence_value("Customer").unwrap(), 7);
    assert!(matches!(
        session.next_sequence_value("Invoice"),
        Err(DataError::Configuration(_))
    ));

    let mut query = session.query_for("Invoice", false).unwrap();
    query.add_condition("customerId", 12, Comparator::Equal);
    assert_eq!(session.delete(&query).unwrap(), 1);

    assert_eq!(
        session.gateway().sql(),
        vec![
            "SELECT nextval('tbl_customer_seq')".to_string(),
            "DELETE FROM tbl_invoice t1 WHERE t1.fk_customer=:t1.fk_customer_0".to_string(),
        ]
    );
}

#[test]
fn test_raw_statement_mapped_to_entity() {
    let gateway = RecordingGateway::with_results(vec![Ok(vec![invoice(8, 42.0)])]);
    let session = Session::new(gateway, common::cache(), Default::default());

    let mut query = QueryBuilder::new("SELECT pk_invoice, fk_customer, inv_total FROM tbl_invoice")
        .mapped_as("Invoice", false);
    query.add_condition("fk_customer", 12, Comparator::Equal);

    let records = session.find(&mut query).unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].entity(), "Invoice");
    assert_eq!(records[0].get("id"), Some(&Value::Int(8)));
    assert_eq!(
        session.gateway().sql(),
        vec![
            "SELECT pk_invoice, fk_customer, inv_total FROM tbl_invoice WHERE fk_customer=:fk_customer_0"
                .to_string()
        ]
    );
}
