#[path = "../common/mod.rs"]
mod common;

use chrono::NaiveDate;
use std::sync::Arc;

use querymap::cache::MetadataCache;
use querymap::crypto::TextCipher;
use querymap::error::DataError;
use querymap::mapper::{encode, Field, Row};
use querymap::metadata::{ColumnDescriptor, EntityDescriptor, EntityRegistry};
use querymap::value::Value;
use serde::Deserialize;

fn customer_row(cipher: &TextCipher) -> Row {
    let born = NaiveDate::from_ymd_opt(1985, 11, 2).unwrap();
    common::row(&[
        ("pk_customer", Value::Int(12)),
        ("cst_name", Value::from("Ann Lee")),
        ("cst_email", Value::from(cipher.encrypt_text("ann@example.com").unwrap())),
        ("cst_birth_date", Value::DateTime(born.and_hms_opt(0, 0, 0).unwrap())),
        ("cst_status", Value::from("BLOCKED")),
        ("cst_street", Value::from("Main 1")),
        ("cst_city", Value::from("Lyon")),
        ("pk_country", Value::Int(33)),
        ("CTR_NAME", Value::from("France")),
    ])
}

#[test]
fn test_eager_record_with_decrypted_column() {
    let cipher = TextCipher::generate();
    let row = customer_row(&cipher);
    let cache = common::cache_with_cipher(cipher);

    let record = cache.row_mapper("Customer", true).unwrap().map_row(&row).unwrap();

    assert_eq!(record.entity(), "Customer");
    assert_eq!(record.get("email"), Some(&Value::from("ann@example.com")));
    assert_eq!(
        record.get("birthDate"),
        Some(&Value::Date(NaiveDate::from_ymd_opt(1985, 11, 2).unwrap()))
    );
    assert!(matches!(record.get("status"), Some(Value::Enum(e)) if e.name == "BLOCKED"));
    assert_eq!(record.get("address.city"), Some(&Value::from("Lyon")));
    assert_eq!(record.get("country.name"), Some(&Value::from("France")));

    let names: Vec<&str> = record.fields().iter().map(|(name, _)| name.as_str()).collect();
    assert_eq!(
        names,
        vec!["id", "name", "email", "birthDate", "status", "address", "country"]
    );
}

#[test]
fn test_lazy_record_leaves_join_empty() {
    let cipher = TextCipher::generate();
    let row = customer_row(&cipher);
    let cache = common::cache_with_cipher(cipher);

    let record = cache.row_mapper("Customer", false).unwrap().map_row(&row).unwrap();
    assert_eq!(record.field("country"), Some(&Field::Nested(None)));
    assert!(record.nested("address").is_some());
}

#[test]
fn test_wrong_key_fails_the_row() {
    let row = customer_row(&TextCipher::generate());
    let cache = common::cache_with_cipher(TextCipher::generate());

    let err = cache.row_mapper("Customer", false).unwrap().map_row(&row).unwrap_err();
    assert!(err.is_decryption());
    assert!(matches!(err, DataError::Decryption { ref column, .. } if column == "cst_email"));
}

#[test]
fn test_encrypted_column_without_key() {
    let row = customer_row(&TextCipher::generate());
    let err = common::cache()
        .row_mapper("Customer", false)
        .unwrap()
        .map_row(&row)
        .unwrap_err();
    assert!(matches!(err, DataError::Configuration(_)));
}

#[test]
fn test_map_into_caller_struct() {
    #[derive(Debug, Deserialize)]
    struct Address {
        city: String,
    }

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct Customer {
        id: i64,
        name: String,
        birth_date: NaiveDate,
        status: String,
        address: Option<Address>,
    }

    let cipher = TextCipher::generate();
    let row = customer_row(&cipher);
    let cache = common::cache_with_cipher(cipher);

    let customer: Customer = cache
        .row_mapper("Customer", false)
        .unwrap()
        .map_into(&row)
        .unwrap();

    assert_eq!(customer.id, 12);
    assert_eq!(customer.name, "Ann Lee");
    assert_eq!(customer.birth_date, NaiveDate::from_ymd_opt(1985, 11, 2).unwrap());
    assert_eq!(customer.status, "BLOCKED");
    assert_eq!(customer.address.map(|a| a.city).as_deref(), Some("Lyon"));
}

#[test]
fn test_encode_round_trips_through_decrypt() {
    let cipher = TextCipher::generate();
    let column = ColumnDescriptor::new("cst_email").encrypted();

    let bound = encode(&column, &Value::from("ann@example.com"), Some(&cipher)).unwrap();
    let Value::Text(stored) = bound else {
        panic!("encrypted value must bind as text");
    };
    assert_ne!(stored, "ann@example.com");
    assert_eq!(cipher.decrypt_text(&stored).unwrap(), "ann@example.com");
}

#[test]
fn test_blank_alias_reads_the_column_name() {
    let registry = EntityRegistry::new();
    registry.register_descriptor(
        EntityDescriptor::table("Tag", "tbl_tag")
            .key("pk_tag")
            .column("id", ColumnDescriptor::new("pk_tag").alias(""))
            .column("label", ColumnDescriptor::new("tag_label").alias("  ")),
    );
    let cache = MetadataCache::new(Arc::new(registry));

    assert_eq!(
        cache.sql_base("Tag", false).unwrap().sql,
        "SELECT t1.pk_tag, t1.tag_label FROM tbl_tag t1"
    );

    let row = common::row(&[("pk_tag", Value::Int(4)), ("tag_label", Value::from("new"))]);
    let record = cache.row_mapper("Tag", false).unwrap().map_row(&row).unwrap();
    assert_eq!(record.get("id"), Some(&Value::Int(4)));
    assert_eq!(record.get("label"), Some(&Value::from("new")));
}
