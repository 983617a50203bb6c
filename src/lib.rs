//! # querymap
//!
//! Dynamic SQL construction and row materialization over declarative entity
//! metadata.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │        EntityDescriptor (tables, views, groups, joins)   │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [DescriptorProvider]
//! ┌─────────────────────────────────────────────────────────┐
//! │                    MetadataCache                         │
//! │   SqlBase + AliasMap │ TranslationMap │ RowMapper        │
//! └─────────────────────────────────────────────────────────┘
//!            │                                  ▲
//!            ▼ [QueryBuilder]                   │ rows
//! ┌─────────────────────────────────────────────────────────┐
//! │   SELECT / COUNT / DELETE + named parameters             │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [Dialect + Session]
//! ┌─────────────────────────────────────────────────────────┐
//! │              StatementGateway (caller's driver)          │
//! └─────────────────────────────────────────────────────────┘
//! ```

pub mod cache;
pub mod config;
pub mod crypto;
pub mod dialect;
pub mod error;
pub mod gateway;
pub mod mapper;
pub mod metadata;
pub mod query;
pub mod value;

#[cfg(test)]
mod test_utils;

/// Re-exports for convenient usage.
pub mod prelude {
    pub use crate::cache::MetadataCache;
    pub use crate::dialect::{Dialect, SqlDialect};
    pub use crate::error::{DataError, DataResult};
    pub use crate::gateway::{Paginator, Session, StatementGateway};
    pub use crate::mapper::{Field, Record, Row, RowMapper};
    pub use crate::metadata::{
        ColumnDescriptor, ConverterKind, Entity, EntityDescriptor, EntityRegistry, EnumMapping,
        FieldType, JoinDescriptor, JoinOperator,
    };
    pub use crate::query::{
        BuilderOptions, Comparator, Condition, DataType, GroupCondition, IsCheck, MatchMode,
        OrderBy, QueryBuilder, SortOrder,
    };
    pub use crate::value::{EnumId, EnumValue, Params, SqlEnum, Value};
}

// Also export at crate root for convenience
pub use cache::MetadataCache;
pub use dialect::Dialect;
pub use error::{DataError, DataResult};
pub use gateway::{Session, StatementGateway};
pub use query::QueryBuilder;
pub use value::Value;
