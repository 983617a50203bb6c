//! Metadata and row-mapping cache.
//!
//! Derives, once per entity, everything a query needs from the descriptor
//! tree and keeps it for the lifetime of the cache:
//!
//! ```text
//! (entity, load_all) -> SqlBase     base projection + alias map
//! entity             -> TranslationMap
//! (entity, load_all) -> RowMapper   compiled materialization plan
//! ```
//!
//! # Design
//!
//! - Owned handle, cheap to clone, shared across threads
//! - No eviction; entries live as long as the cache
//! - Derivation runs outside any map lock; concurrent first access to the
//!   same key may derive twice, and the first inserted value wins
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use querymap::cache::MetadataCache;
//! use querymap::metadata::{ColumnDescriptor, EntityDescriptor, EntityRegistry};
//!
//! let registry = EntityRegistry::new();
//! registry.register_descriptor(
//!     EntityDescriptor::table("TestType", "tmp_test_type")
//!         .key("pk_test_type")
//!         .column("id", ColumnDescriptor::new("pk_test_type")),
//! );
//!
//! let cache = MetadataCache::new(Arc::new(registry));
//! let base = cache.sql_base("TestType", false).unwrap();
//! assert_eq!(base.sql, "SELECT t1.pk_test_type FROM tmp_test_type t1");
//! ```

mod projection;
mod translation;

pub use projection::{AliasMap, SqlBase};
pub use translation::TranslationMap;

use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use dashmap::DashMap;
use tracing::debug;

use crate::crypto::TextCipher;
use crate::error::DataResult;
use crate::mapper::RowMapper;
use crate::metadata::{DescriptorProvider, EntityDescriptor};

type VariantKey = (String, bool);

struct CacheInner {
    provider: Arc<dyn DescriptorProvider>,
    cipher: Option<Arc<TextCipher>>,
    sql_bases: DashMap<VariantKey, Arc<SqlBase>>,
    translations: DashMap<String, Arc<TranslationMap>>,
    mappers: DashMap<VariantKey, Arc<RowMapper>>,
}

/// Shared, concurrently readable derivation cache.
#[derive(Clone)]
pub struct MetadataCache {
    inner: Arc<CacheInner>,
}

impl fmt::Debug for MetadataCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetadataCache")
            .field("sql_bases", &self.inner.sql_bases.len())
            .field("translations", &self.inner.translations.len())
            .field("mappers", &self.inner.mappers.len())
            .field("cipher", &self.inner.cipher.is_some())
            .finish()
    }
}

impl MetadataCache {
    pub fn new(provider: Arc<dyn DescriptorProvider>) -> Self {
        Self::build(provider, None)
    }

    /// Cache whose row mappers can decrypt encrypted columns.
    pub fn with_cipher(provider: Arc<dyn DescriptorProvider>, cipher: TextCipher) -> Self {
        Self::build(provider, Some(Arc::new(cipher)))
    }

    fn build(provider: Arc<dyn DescriptorProvider>, cipher: Option<Arc<TextCipher>>) -> Self {
        Self {
            inner: Arc::new(CacheInner {
                provider,
                cipher,
                sql_bases: DashMap::new(),
                translations: DashMap::new(),
                mappers: DashMap::new(),
            }),
        }
    }

    pub fn descriptor(&self, entity: &str) -> DataResult<Arc<EntityDescriptor>> {
        self.inner.provider.descriptor(entity)
    }

    pub fn cipher(&self) -> Option<&TextCipher> {
        self.inner.cipher.as_deref()
    }

    /// Base projection for the lazy (`load_all = false`) or eager variant.
    pub fn sql_base(&self, entity: &str, load_all: bool) -> DataResult<Arc<SqlBase>> {
        get_or_derive(
            &self.inner.sql_bases,
            (entity.to_string(), load_all),
            || {
                let base =
                    projection::derive_sql_base(self.inner.provider.as_ref(), entity, load_all)?;
                debug!(entity, load_all, sql = %base.sql, "derived base projection");
                Ok(base)
            },
        )
    }

    pub fn translation_map(&self, entity: &str) -> DataResult<Arc<TranslationMap>> {
        get_or_derive(&self.inner.translations, entity.to_string(), || {
            let map = translation::derive_translation(self.inner.provider.as_ref(), entity)?;
            debug!(entity, entries = map.len(), "derived translation map");
            Ok(map)
        })
    }

    pub fn row_mapper(&self, entity: &str, load_all: bool) -> DataResult<Arc<RowMapper>> {
        get_or_derive(
            &self.inner.mappers,
            (entity.to_string(), load_all),
            || {
                let mapper = RowMapper::compile(
                    self.inner.provider.as_ref(),
                    entity,
                    load_all,
                    self.inner.cipher.clone(),
                )?;
                debug!(entity, load_all, "compiled row mapper");
                Ok(mapper)
            },
        )
    }

    /// Number of memoized entries across all three maps.
    pub fn len(&self) -> usize {
        self.inner.sql_bases.len() + self.inner.translations.len() + self.inner.mappers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn get_or_derive<K, V, F>(map: &DashMap<K, Arc<V>>, key: K, derive: F) -> DataResult<Arc<V>>
where
    K: Eq + Hash,
    F: FnOnce() -> DataResult<V>,
{
    if let Some(hit) = map.get(&key) {
        return Ok(Arc::clone(hit.value()));
    }
    let derived = Arc::new(derive()?);
    let entry = map.entry(key).or_insert(derived);
    Ok(Arc::clone(entry.value()))
}
