//! Property-path to column translation.

use std::collections::HashMap;

use crate::error::DataResult;
use crate::metadata::{DescriptorProvider, EntityDescriptor, FieldKind};

/// Declared property path (`"type.name"`) to `declared_table.column`.
pub type TranslationMap = HashMap<String, String>;

/// Derive the translation map of `entity`.
///
/// Groups keep the enclosing table, joins switch to the target's table. Paths
/// that would revisit an entity already on the current branch are skipped,
/// so self references terminate. View columns translate to their bare name.
pub(crate) fn derive_translation(
    provider: &dyn DescriptorProvider,
    entity: &str,
) -> DataResult<TranslationMap> {
    let descriptor = provider.descriptor(entity)?;
    let mut map = TranslationMap::new();
    let mut path = vec![descriptor.name.clone()];
    extract(
        provider,
        &descriptor,
        descriptor.table_name(),
        "",
        &mut map,
        &mut path,
    )?;
    Ok(map)
}

fn extract(
    provider: &dyn DescriptorProvider,
    descriptor: &EntityDescriptor,
    table: Option<&str>,
    prefix: &str,
    map: &mut TranslationMap,
    path: &mut Vec<String>,
) -> DataResult<()> {
    for field in &descriptor.fields {
        let key = format!("{}{}", prefix, field.name);
        match &field.kind {
            FieldKind::Column(column) => {
                let qualified = match table {
                    Some(table) => format!("{}.{}", table, column.name),
                    None => column.name.clone(),
                };
                map.insert(key, qualified);
            }
            FieldKind::Group(group) => {
                if path.contains(&group.target) {
                    continue;
                }
                let target = provider.descriptor(&group.target)?;
                path.push(group.target.clone());
                extract(provider, &target, table, &format!("{}.", key), map, path)?;
                path.pop();
            }
            FieldKind::Join(join) => {
                if path.contains(&join.target) {
                    continue;
                }
                let target = provider.descriptor(&join.target)?;
                path.push(join.target.clone());
                extract(
                    provider,
                    &target,
                    target.table_name(),
                    &format!("{}.", key),
                    map,
                    path,
                )?;
                path.pop();
            }
        }
    }
    Ok(())
}
