//! Entity descriptor types.
//!
//! A descriptor is the declarative metadata of one mapped type: where its rows
//! come from, which columns it projects, and which nested groups and joined
//! entities hang off it. Descriptors are built once through the fluent
//! constructors below and never mutated afterwards.

use serde::{Deserialize, Serialize};

use crate::value::{EnumId, Value};

// ============================================================================
// Field-level metadata
// ============================================================================

/// Declared kind of a column's field, driving row-value widening.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    /// Keep whatever the gateway returned.
    #[default]
    Any,
    Integer,
    Float,
    Text,
    Bool,
    Date,
    DateTime,
    Bytes,
}

/// One variant of an enum stored in a column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumVariant {
    pub name: String,
    pub id: EnumId,
}

/// Variants of an application enum, used by the enum converters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumMapping {
    pub type_name: String,
    pub variants: Vec<EnumVariant>,
}

impl EnumMapping {
    pub fn new(type_name: &str) -> Self {
        Self {
            type_name: type_name.to_string(),
            variants: Vec::new(),
        }
    }

    /// Add a variant stored by an integer id.
    pub fn variant(mut self, name: &str, id: i64) -> Self {
        self.variants.push(EnumVariant {
            name: name.to_string(),
            id: EnumId::Int(id),
        });
        self
    }

    /// Add a variant stored by a text id.
    pub fn text_variant(mut self, name: &str, id: &str) -> Self {
        self.variants.push(EnumVariant {
            name: name.to_string(),
            id: EnumId::Text(id.to_string()),
        });
        self
    }

    /// Add a variant identified by name only.
    pub fn named(self, name: &str) -> Self {
        self.text_variant(name, name)
    }

    pub fn by_name(&self, name: &str) -> Option<&EnumVariant> {
        self.variants.iter().find(|v| v.name == name)
    }

    /// Find the variant whose id matches a row value.
    ///
    /// Numeric text is compared against integer ids, so `"2"` finds id `2`.
    pub fn by_id(&self, value: &Value) -> Option<&EnumVariant> {
        self.variants.iter().find(|v| match (&v.id, value) {
            (EnumId::Int(id), other) => other.as_i64() == Some(*id),
            (EnumId::Text(id), Value::Text(s)) => id == s,
            (EnumId::Text(id), Value::Int(i)) => id == &i.to_string(),
            _ => false,
        })
    }
}

/// Closed set of column converters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConverterKind {
    /// Enum stored by its id.
    EnumById(EnumMapping),
    /// Enum stored by its variant name.
    EnumByName(EnumMapping),
    /// JSON object stored as text.
    Json,
    /// JSON array stored as text.
    JsonList,
    /// JSON object stored as bytes.
    ByteaJson,
    /// JSON array stored as bytes.
    ByteaJsonList,
    /// AES-256-GCM encrypted text.
    Encrypted,
}

/// A physical column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    pub name: String,
    /// Read alias used in the projection (`col AS alias`).
    pub alias: Option<String>,
    pub converter: Option<ConverterKind>,
    pub length: Option<usize>,
    pub insertable: bool,
    pub updatable: bool,
    pub serial: bool,
    pub field_type: FieldType,
}

impl ColumnDescriptor {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            alias: None,
            converter: None,
            length: None,
            insertable: true,
            updatable: true,
            serial: false,
            field_type: FieldType::Any,
        }
    }

    pub fn alias(mut self, alias: &str) -> Self {
        self.alias = Some(alias.to_string());
        self
    }

    pub fn converter(mut self, converter: ConverterKind) -> Self {
        self.converter = Some(converter);
        self
    }

    pub fn encrypted(self) -> Self {
        self.converter(ConverterKind::Encrypted)
    }

    pub fn length(mut self, length: usize) -> Self {
        self.length = Some(length);
        self
    }

    pub fn field_type(mut self, field_type: FieldType) -> Self {
        self.field_type = field_type;
        self
    }

    pub fn insertable(mut self, insertable: bool) -> Self {
        self.insertable = insertable;
        self
    }

    pub fn updatable(mut self, updatable: bool) -> Self {
        self.updatable = updatable;
        self
    }

    /// Mark the column as filled by a sequence.
    pub fn serial(mut self) -> Self {
        self.serial = true;
        self
    }

    /// Explicit `AS` label; a blank alias counts as none.
    pub fn label(&self) -> Option<&str> {
        self.alias.as_deref().filter(|a| !a.trim().is_empty())
    }

    /// Name the column is read back under.
    pub fn read_name(&self) -> &str {
        self.label().unwrap_or(&self.name)
    }

    pub fn is_encrypted(&self) -> bool {
        matches!(self.converter, Some(ConverterKind::Encrypted))
    }
}

/// An embedded value object flattened into the enclosing table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupDescriptor {
    pub target: String,
    pub nullable: bool,
}

/// SQL join operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JoinOperator {
    #[default]
    InnerJoin,
    LeftJoin,
    RightJoin,
    FullJoin,
}

impl JoinOperator {
    pub fn as_sql(&self) -> &'static str {
        match self {
            JoinOperator::InnerJoin => "INNER JOIN",
            JoinOperator::LeftJoin => "LEFT JOIN",
            JoinOperator::RightJoin => "RIGHT JOIN",
            JoinOperator::FullJoin => "FULL JOIN",
        }
    }
}

impl std::fmt::Display for JoinOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// A reference to another entity through a foreign key of this table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinDescriptor {
    pub target: String,
    /// Column of the parent table holding the target's key.
    pub foreign_key: String,
    pub operator: JoinOperator,
    pub lazy: bool,
}

impl JoinDescriptor {
    pub fn new(target: &str, foreign_key: &str) -> Self {
        Self {
            target: target.to_string(),
            foreign_key: foreign_key.to_string(),
            operator: JoinOperator::InnerJoin,
            lazy: false,
        }
    }

    pub fn operator(mut self, operator: JoinOperator) -> Self {
        self.operator = operator;
        self
    }

    /// Only project and map this join in the load-all variant.
    pub fn lazy(mut self) -> Self {
        self.lazy = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldKind {
    Column(ColumnDescriptor),
    Group(GroupDescriptor),
    Join(JoinDescriptor),
}

/// A named field of an entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub name: String,
    pub kind: FieldKind,
}

// ============================================================================
// Entity-level metadata
// ============================================================================

/// Where an entity's rows come from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EntitySource {
    Table(String),
    /// Literal SELECT used verbatim as the base projection.
    View(String),
    /// Group target living inside its owner's table.
    Embedded,
}

/// Declarative metadata for one mapped type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityDescriptor {
    pub name: String,
    pub source: EntitySource,
    pub keys: Vec<String>,
    pub sequence: Option<String>,
    pub default_order_by: Option<String>,
    pub readonly: bool,
    pub fields: Vec<FieldDescriptor>,
}

impl EntityDescriptor {
    fn with_source(name: &str, source: EntitySource) -> Self {
        Self {
            name: name.to_string(),
            source,
            keys: Vec::new(),
            sequence: None,
            default_order_by: None,
            readonly: false,
            fields: Vec::new(),
        }
    }

    /// An entity backed by a table.
    pub fn table(name: &str, table: &str) -> Self {
        Self::with_source(name, EntitySource::Table(table.to_string()))
    }

    /// An entity backed by a literal SELECT.
    pub fn view(name: &str, sql: &str) -> Self {
        let mut descriptor = Self::with_source(name, EntitySource::View(sql.to_string()));
        descriptor.readonly = true;
        descriptor
    }

    /// A value object embedded into another entity's table.
    pub fn embedded(name: &str) -> Self {
        Self::with_source(name, EntitySource::Embedded)
    }

    pub fn key(mut self, column: &str) -> Self {
        self.keys.push(column.to_string());
        self
    }

    pub fn sequence(mut self, sequence: &str) -> Self {
        self.sequence = Some(sequence.to_string());
        self
    }

    pub fn default_order_by(mut self, column: &str) -> Self {
        self.default_order_by = Some(column.to_string());
        self
    }

    pub fn readonly(mut self) -> Self {
        self.readonly = true;
        self
    }

    pub fn column(mut self, field: &str, column: ColumnDescriptor) -> Self {
        self.fields.push(FieldDescriptor {
            name: field.to_string(),
            kind: FieldKind::Column(column),
        });
        self
    }

    pub fn group(mut self, field: &str, target: &str, nullable: bool) -> Self {
        self.fields.push(FieldDescriptor {
            name: field.to_string(),
            kind: FieldKind::Group(GroupDescriptor {
                target: target.to_string(),
                nullable,
            }),
        });
        self
    }

    pub fn join(mut self, field: &str, join: JoinDescriptor) -> Self {
        self.fields.push(FieldDescriptor {
            name: field.to_string(),
            kind: FieldKind::Join(join),
        });
        self
    }

    pub fn table_name(&self) -> Option<&str> {
        match &self.source {
            EntitySource::Table(table) => Some(table),
            _ => None,
        }
    }

    pub fn view_sql(&self) -> Option<&str> {
        match &self.source {
            EntitySource::View(sql) => Some(sql),
            _ => None,
        }
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Columns declared directly on this entity, with their field names.
    pub fn columns(&self) -> impl Iterator<Item = (&str, &ColumnDescriptor)> {
        self.fields.iter().filter_map(|f| match &f.kind {
            FieldKind::Column(c) => Some((f.name.as_str(), c)),
            _ => None,
        })
    }

    pub fn joins(&self) -> impl Iterator<Item = (&str, &JoinDescriptor)> {
        self.fields.iter().filter_map(|f| match &f.kind {
            FieldKind::Join(j) => Some((f.name.as_str(), j)),
            _ => None,
        })
    }

    pub fn has_joins(&self) -> bool {
        self.joins().next().is_some()
    }
}

/// Implemented by types that describe their own mapping.
///
/// ```rust
/// use querymap::metadata::{ColumnDescriptor, Entity, EntityDescriptor};
///
/// struct TestType;
///
/// impl Entity for TestType {
///     fn descriptor() -> EntityDescriptor {
///         EntityDescriptor::table("TestType", "tmp_test_type")
///             .key("pk_test_type")
///             .column("id", ColumnDescriptor::new("pk_test_type"))
///             .column("name", ColumnDescriptor::new("name").alias("tt_name"))
///     }
/// }
///
/// assert_eq!(TestType::descriptor().table_name(), Some("tmp_test_type"));
/// ```
pub trait Entity {
    fn descriptor() -> EntityDescriptor;
}
