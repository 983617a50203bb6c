//! Row materialization.
//!
//! A [`RowMapper`] is compiled once per (entity, load_all) from the descriptor
//! tree and then applied to every row a query returns. It never reflects on
//! caller types: rows become [`Record`]s, and [`RowMapper::map_into`] hands the
//! record to serde for callers that want their own structs.
//!
//! Failure handling follows the shape of the tree:
//!
//! - a top-level column failure fails the row
//! - a nullable group that fails becomes `Nested(None)`, a non-nullable one
//!   fails the row; decryption failures always fail the row
//! - a join that fails becomes `Nested(None)`

mod convert;

pub use convert::{coerce, decode, encode};

use std::collections::HashMap;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use tracing::warn;

use crate::crypto::TextCipher;
use crate::error::{DataError, DataResult};
use crate::metadata::{ColumnDescriptor, DescriptorProvider, FieldKind};
use crate::value::Value;

/// One result row, keyed by column label.
pub type Row = HashMap<String, Value>;

/// A materialized field.
#[derive(Debug, Clone, PartialEq)]
pub enum Field {
    Value(Value),
    /// A group or join; `None` when absent or not loaded.
    Nested(Option<Record>),
}

/// A materialized entity, fields in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    entity: String,
    fields: Vec<(String, Field)>,
}

impl Record {
    pub fn entity(&self) -> &str {
        &self.entity
    }

    pub fn fields(&self) -> &[(String, Field)] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, f)| f)
    }

    pub fn nested(&self, name: &str) -> Option<&Record> {
        match self.field(name) {
            Some(Field::Nested(Some(record))) => Some(record),
            _ => None,
        }
    }

    /// Resolve a dotted property path such as `"type.name"`.
    pub fn get(&self, path: &str) -> Option<&Value> {
        match path.split_once('.') {
            Some((head, rest)) => self.nested(head)?.get(rest),
            None => match self.field(path)? {
                Field::Value(value) => Some(value),
                Field::Nested(_) => None,
            },
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        let object = self
            .fields
            .iter()
            .map(|(name, field)| {
                let value = match field {
                    Field::Value(v) => v.to_json(),
                    Field::Nested(Some(record)) => record.to_json(),
                    Field::Nested(None) => serde_json::Value::Null,
                };
                (name.clone(), value)
            })
            .collect();
        serde_json::Value::Object(object)
    }
}

// ============================================================================
// Compiled plan
// ============================================================================

#[derive(Debug)]
enum Step {
    Column {
        field: String,
        column: ColumnDescriptor,
    },
    Group {
        field: String,
        nullable: bool,
        plan: Plan,
    },
    Join {
        field: String,
        plan: Option<Plan>,
    },
}

#[derive(Debug)]
struct Plan {
    entity: String,
    steps: Vec<Step>,
}

/// Cached materializer for one entity variant.
#[derive(Debug)]
pub struct RowMapper {
    plan: Plan,
    load_all: bool,
    cipher: Option<Arc<TextCipher>>,
}

impl RowMapper {
    /// Compile the plan for `entity`.
    ///
    /// Lazy joins are only followed when `load_all` is set; otherwise they
    /// materialize as `Nested(None)`.
    pub fn compile(
        provider: &dyn DescriptorProvider,
        entity: &str,
        load_all: bool,
        cipher: Option<Arc<TextCipher>>,
    ) -> DataResult<Self> {
        let mut path = Vec::new();
        let plan = compile_plan(provider, entity, load_all, &mut path)?;
        Ok(Self {
            plan,
            load_all,
            cipher,
        })
    }

    pub fn entity(&self) -> &str {
        &self.plan.entity
    }

    pub fn is_load_all(&self) -> bool {
        self.load_all
    }

    pub fn map_row(&self, row: &Row) -> DataResult<Record> {
        self.materialize(&self.plan, row)
    }

    pub fn map_rows(&self, rows: &[Row]) -> DataResult<Vec<Record>> {
        rows.iter().map(|row| self.map_row(row)).collect()
    }

    /// Materialize a row straight into a caller type through its JSON form.
    pub fn map_into<T: DeserializeOwned>(&self, row: &Row) -> DataResult<T> {
        let record = self.map_row(row)?;
        serde_json::from_value(record.to_json())
            .map_err(|e| DataError::conversion(self.entity(), e.to_string()))
    }

    fn materialize(&self, plan: &Plan, row: &Row) -> DataResult<Record> {
        let mut fields = Vec::with_capacity(plan.steps.len());
        for step in &plan.steps {
            match step {
                Step::Column { field, column } => {
                    let raw = read_column(&plan.entity, row, column.read_name())?;
                    let value = decode(&plan.entity, column, raw, self.cipher.as_deref())?;
                    fields.push((field.clone(), Field::Value(value)));
                }
                Step::Group {
                    field,
                    nullable,
                    plan: group,
                } => {
                    let nested = match self.materialize(group, row) {
                        Ok(record) => Some(record),
                        Err(e) if e.is_decryption() => return Err(e),
                        Err(e) if *nullable => {
                            warn!(entity = %plan.entity, field = %field, error = %e, "group resolved to null");
                            None
                        }
                        Err(e) => {
                            return Err(DataError::conversion(
                                &plan.entity,
                                format!("{} ({}) cannot be null: {}", field, group.entity, e),
                            ))
                        }
                    };
                    fields.push((field.clone(), Field::Nested(nested)));
                }
                Step::Join { field, plan: None } => {
                    fields.push((field.clone(), Field::Nested(None)));
                }
                Step::Join {
                    field,
                    plan: Some(joined),
                } => {
                    let nested = match self.materialize(joined, row) {
                        Ok(record) => Some(record),
                        Err(e) => {
                            warn!(entity = %plan.entity, field = %field, error = %e, "join resolved to null");
                            None
                        }
                    };
                    fields.push((field.clone(), Field::Nested(nested)));
                }
            }
        }
        Ok(Record {
            entity: plan.entity.clone(),
            fields,
        })
    }
}

fn compile_plan(
    provider: &dyn DescriptorProvider,
    entity: &str,
    load_all: bool,
    path: &mut Vec<String>,
) -> DataResult<Plan> {
    if path.iter().any(|p| p == entity) {
        return Err(DataError::config(format!(
            "cyclic reference to {} through {}",
            entity,
            path.join(" -> ")
        )));
    }
    let descriptor = provider.descriptor(entity)?;
    path.push(entity.to_string());

    let mut steps = Vec::with_capacity(descriptor.fields.len());
    for field in &descriptor.fields {
        let step = match &field.kind {
            FieldKind::Column(column) => Step::Column {
                field: field.name.clone(),
                column: column.clone(),
            },
            FieldKind::Group(group) => Step::Group {
                field: field.name.clone(),
                nullable: group.nullable,
                plan: compile_plan(provider, &group.target, load_all, path)?,
            },
            FieldKind::Join(join) if join.lazy && !load_all => Step::Join {
                field: field.name.clone(),
                plan: None,
            },
            FieldKind::Join(join) => Step::Join {
                field: field.name.clone(),
                plan: Some(compile_plan(provider, &join.target, load_all, path)?),
            },
        };
        steps.push(step);
    }

    path.pop();
    Ok(Plan {
        entity: descriptor.name.clone(),
        steps,
    })
}

/// Look a column up by label, exact match first, then case-insensitively.
fn read_column(entity: &str, row: &Row, label: &str) -> DataResult<Value> {
    if let Some(value) = row.get(label) {
        return Ok(value.clone());
    }
    row.iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(label))
        .map(|(_, value)| value.clone())
        .ok_or_else(|| DataError::conversion(entity, format!("column {} not found in row", label)))
}
