//! Entity metadata.
//!
//! Descriptors say how a mapped type lines up with the database: its table or
//! literal view, primary key, columns, embedded groups and joins. They are
//! consumed read-only by the [`crate::cache`] through a [`DescriptorProvider`].
//!
//! ```text
//! Entity::descriptor() ──▶ EntityRegistry ──▶ MetadataCache
//!                          (DescriptorProvider)  (projection, translation, mapper)
//! ```

mod descriptor;
mod registry;

pub use descriptor::{
    ColumnDescriptor, ConverterKind, Entity, EntityDescriptor, EntitySource, EnumMapping,
    EnumVariant, FieldDescriptor, FieldKind, FieldType, GroupDescriptor, JoinDescriptor,
    JoinOperator,
};
pub use registry::{DescriptorProvider, EntityRegistry};
