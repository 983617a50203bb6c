//! Shared fixtures for integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use querymap::cache::MetadataCache;
use querymap::crypto::TextCipher;
use querymap::mapper::Row;
use querymap::metadata::{
    ColumnDescriptor, ConverterKind, Entity, EntityDescriptor, EntityRegistry, EnumMapping,
    FieldType, JoinDescriptor, JoinOperator,
};
use querymap::value::Value;

pub struct Country;

impl Entity for Country {
    fn descriptor() -> EntityDescriptor {
        EntityDescriptor::table("Country", "tbl_country")
            .key("pk_country")
            .column("id", ColumnDescriptor::new("pk_country").field_type(FieldType::Integer))
            .column("name", ColumnDescriptor::new("name").alias("ctr_name"))
    }
}

pub struct Address;

impl Entity for Address {
    fn descriptor() -> EntityDescriptor {
        EntityDescriptor::embedded("Address")
            .column("street", ColumnDescriptor::new("cst_street"))
            .column("city", ColumnDescriptor::new("cst_city"))
    }
}

pub struct Customer;

impl Entity for Customer {
    fn descriptor() -> EntityDescriptor {
        EntityDescriptor::table("Customer", "tbl_customer")
            .key("pk_customer")
            .sequence("tbl_customer_seq")
            .default_order_by("pk_customer")
            .column(
                "id",
                ColumnDescriptor::new("pk_customer")
                    .serial()
                    .field_type(FieldType::Integer),
            )
            .column("name", ColumnDescriptor::new("cst_name").length(60))
            .column("email", ColumnDescriptor::new("cst_email").encrypted())
            .column(
                "birthDate",
                ColumnDescriptor::new("cst_birth_date").field_type(FieldType::Date),
            )
            .column(
                "status",
                ColumnDescriptor::new("cst_status").converter(ConverterKind::EnumByName(
                    EnumMapping::new("Status").named("ACTIVE").named("BLOCKED"),
                )),
            )
            .group("address", "Address", true)
            .join(
                "country",
                JoinDescriptor::new("Country", "fk_country")
                    .operator(JoinOperator::LeftJoin)
                    .lazy(),
            )
    }
}

pub struct Invoice;

impl Entity for Invoice {
    fn descriptor() -> EntityDescriptor {
        EntityDescriptor::table("Invoice", "tbl_invoice")
            .key("pk_invoice")
            .column("id", ColumnDescriptor::new("pk_invoice"))
            .column("customerId", ColumnDescriptor::new("fk_customer"))
            .column("total", ColumnDescriptor::new("inv_total").field_type(FieldType::Float))
    }
}

pub fn registry() -> EntityRegistry {
    let registry = EntityRegistry::new();
    registry
        .register::<Country>()
        .register::<Address>()
        .register::<Customer>()
        .register::<Invoice>();
    registry
}

pub fn cache() -> MetadataCache {
    MetadataCache::new(Arc::new(registry()))
}

pub fn cache_with_cipher(cipher: TextCipher) -> MetadataCache {
    MetadataCache::with_cipher(Arc::new(registry()), cipher)
}

pub fn row(entries: &[(&str, Value)]) -> Row {
    entries
        .iter()
        .map(|(label, value)| (label.to_string(), value.clone()))
        .collect()
}
