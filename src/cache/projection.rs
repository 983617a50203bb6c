//! Base projection derivation.
//!
//! Walks a descriptor tree and renders the `SELECT ... FROM table t1 JOIN ...`
//! statement every query against that entity starts from. Each table receives
//! a short alias (`t1`, `t2`, ...) in the order it is first reached; the
//! primary table is always `t1`.

use std::collections::HashMap;

use crate::error::{DataError, DataResult};
use crate::metadata::{
    ColumnDescriptor, DescriptorProvider, EntityDescriptor, EntitySource, FieldKind,
    JoinDescriptor,
};

/// Table name to generated alias.
pub type AliasMap = HashMap<String, String>;

/// A derived base projection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlBase {
    pub sql: String,
    pub alias_map: AliasMap,
}

/// Accumulates the pieces of a projection during one derivation pass.
#[derive(Debug, Default)]
struct ProjectionBuilder {
    index: usize,
    table: String,
    columns: Vec<String>,
    joins: String,
    alias_map: AliasMap,
}

impl ProjectionBuilder {
    fn with_table(table: &str) -> Self {
        let mut builder = Self {
            table: table.to_string(),
            ..Self::default()
        };
        builder.generate_alias(table);
        builder
    }

    fn generate_alias(&mut self, table: &str) -> String {
        self.index += 1;
        let alias = format!("t{}", self.index);
        self.alias_map.insert(table.to_string(), alias.clone());
        alias
    }

    fn alias_of(&self, table: &str) -> &str {
        self.alias_map.get(table).map(String::as_str).unwrap_or_default()
    }

    fn add_column(&mut self, table: &str, column: &ColumnDescriptor) {
        let mut rendered = format!("{}.{}", self.alias_of(table), column.name);
        if let Some(alias) = column.label() {
            rendered.push_str(" AS ");
            rendered.push_str(alias);
        }
        self.columns.push(rendered);
    }

    fn add_join(
        &mut self,
        parent_table: &str,
        join: &JoinDescriptor,
        target: &EntityDescriptor,
    ) -> DataResult<String> {
        let target_table = target.table_name().ok_or_else(|| {
            DataError::config(format!(
                "join target {} must be backed by a table",
                target.name
            ))
        })?;
        let [key] = target.keys.as_slice() else {
            return Err(DataError::config(format!(
                "join target {} must declare exactly one primary key",
                target.name
            )));
        };

        let parent_alias = self.alias_of(parent_table).to_string();
        let alias = self.generate_alias(target_table);
        self.joins.push_str(&format!(
            " {} {} {} ON {}.{}={}.{}",
            join.operator, target_table, alias, parent_alias, join.foreign_key, alias, key
        ));
        Ok(target_table.to_string())
    }

    fn finish(self) -> SqlBase {
        let alias = self.alias_of(&self.table).to_string();
        let sql = format!(
            "SELECT {} FROM {} {}{}",
            self.columns.join(", "),
            self.table,
            alias,
            self.joins
        );
        SqlBase {
            sql,
            alias_map: self.alias_map,
        }
    }
}

/// Derive the base projection of `entity`.
///
/// Lazy joins are only projected when `load_all` is set. A view entity
/// returns its literal SQL and an empty alias map.
pub(crate) fn derive_sql_base(
    provider: &dyn DescriptorProvider,
    entity: &str,
    load_all: bool,
) -> DataResult<SqlBase> {
    let descriptor = provider.descriptor(entity)?;
    match &descriptor.source {
        EntitySource::View(sql) => {
            if descriptor.has_joins() {
                return Err(DataError::config(format!(
                    "view {} cannot declare joins",
                    descriptor.name
                )));
            }
            Ok(SqlBase {
                sql: sql.clone(),
                alias_map: AliasMap::new(),
            })
        }
        EntitySource::Embedded => Err(DataError::config(format!(
            "embedded entity {} has no table to select from",
            descriptor.name
        ))),
        EntitySource::Table(table) => {
            let mut builder = ProjectionBuilder::with_table(table);
            let mut path = vec![descriptor.name.clone()];
            collect(provider, &descriptor, table, load_all, &mut builder, &mut path)?;
            Ok(builder.finish())
        }
    }
}

fn collect(
    provider: &dyn DescriptorProvider,
    descriptor: &EntityDescriptor,
    table: &str,
    load_all: bool,
    builder: &mut ProjectionBuilder,
    path: &mut Vec<String>,
) -> DataResult<()> {
    for field in &descriptor.fields {
        match &field.kind {
            FieldKind::Column(column) => builder.add_column(table, column),
            FieldKind::Join(join) if !join.lazy || load_all => {
                let target = enter(provider, &join.target, path)?;
                let target_table = builder.add_join(table, join, &target)?;
                collect(provider, &target, &target_table, load_all, builder, path)?;
                path.pop();
            }
            FieldKind::Join(_) => {}
            FieldKind::Group(group) => {
                let target = enter(provider, &group.target, path)?;
                collect(provider, &target, table, load_all, builder, path)?;
                path.pop();
            }
        }
    }
    Ok(())
}

fn enter(
    provider: &dyn DescriptorProvider,
    target: &str,
    path: &mut Vec<String>,
) -> DataResult<std::sync::Arc<EntityDescriptor>> {
    if path.iter().any(|p| p == target) {
        return Err(DataError::config(format!(
            "cyclic reference to {} through {}",
            target,
            path.join(" -> ")
        )));
    }
    let descriptor = provider.descriptor(target)?;
    path.push(target.to_string());
    Ok(descriptor)
}
