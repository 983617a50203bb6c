//! Statement execution on top of the builder, the dialects and the row mappers.
//!
//! The crate never talks to a database itself. Callers implement
//! [`StatementGateway`] over their driver; [`Session`] renders statements,
//! adapts them to the configured [`Dialect`] and materializes the returned
//! rows through the cached [`RowMapper`](crate::mapper::RowMapper).

use tracing::debug;

use crate::cache::MetadataCache;
use crate::dialect::{Dialect, SqlDialect};
use crate::error::{DataError, DataResult};
use crate::mapper::{Record, Row};
use crate::query::{PageIter, QueryBuilder, SortOrder};
use crate::value::Params;

/// Executes finished statements with named parameters.
pub trait StatementGateway {
    /// Run a SELECT and return its rows keyed by column label.
    fn query(&self, sql: &str, params: &Params) -> DataResult<Vec<Row>>;

    /// Run a DML statement and return the number of affected rows.
    fn execute(&self, sql: &str, params: &Params) -> DataResult<u64>;
}

/// One page of records plus the size of the unpaginated result.
#[derive(Debug, Clone, PartialEq)]
pub struct Paginator {
    pub records: Vec<Record>,
    pub total_count: u64,
}

/// Gateway, cache and dialect bound together.
#[derive(Debug)]
pub struct Session<G> {
    gateway: G,
    cache: MetadataCache,
    dialect: Dialect,
}

impl<G: StatementGateway> Session<G> {
    pub fn new(gateway: G, cache: MetadataCache, dialect: Dialect) -> Self {
        Self {
            gateway,
            cache,
            dialect,
        }
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn cache(&self) -> &MetadataCache {
        &self.cache
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Builder over the base projection of `entity`.
    pub fn query_for(&self, entity: &str, load_all: bool) -> DataResult<QueryBuilder> {
        QueryBuilder::for_entity(&self.cache, entity, load_all)
    }

    /// Materialized records for `query`.
    ///
    /// A limited query also runs its COUNT rendering and stores the result in
    /// [`QueryBuilder::total_result_count`].
    pub fn find(&self, query: &mut QueryBuilder) -> DataResult<Vec<Record>> {
        let entity = query
            .entity()
            .ok_or_else(|| DataError::config("query is not mapped to an entity"))?;
        let mapper = self.cache.row_mapper(entity, query.is_load_all())?;
        let rows = self.find_rows(query)?;
        mapper.map_rows(&rows)
    }

    /// Raw rows for `query`, with the same pagination and count rules as [`find`](Self::find).
    pub fn find_rows(&self, query: &mut QueryBuilder) -> DataResult<Vec<Row>> {
        let mut sql = self.dialect.prepare_sql(&query.sql());
        if let Some(limit) = query.limit() {
            sql = self.dialect.paginate(&sql, limit, query.offset());
            let total = self.count(query)?;
            query.set_total_result_count(total);
        }

        debug!(dialect = %self.dialect, sql = %sql, params = query.params().len(), "query");
        let rows = self.gateway.query(&sql, query.params())?;
        debug!(rows = rows.len(), "query returned");
        Ok(rows)
    }

    /// Records for `query` together with the total row count.
    pub fn find_page(&self, query: &mut QueryBuilder) -> DataResult<Paginator> {
        let records = self.find(query)?;
        let total_count = if query.is_limited() {
            query.total_result_count()
        } else {
            records.len() as u64
        };
        Ok(Paginator {
            records,
            total_count,
        })
    }

    /// Number of rows matching `query`, ignoring its limit and ordering.
    pub fn count(&self, query: &QueryBuilder) -> DataResult<u64> {
        let sql = self.dialect.prepare_sql(&query.sql_count()?);
        debug!(dialect = %self.dialect, sql = %sql, "count");

        let rows = self.gateway.query(&sql, query.params())?;
        let value = rows
            .first()
            .and_then(|row| row.values().next())
            .ok_or_else(|| DataError::Gateway("count returned no rows".to_string()))?;
        value
            .as_i64()
            .and_then(|count| u64::try_from(count).ok())
            .ok_or_else(|| DataError::Gateway(format!("count returned a non-numeric value: {}", value)))
    }

    pub fn exists(&self, query: &QueryBuilder) -> DataResult<bool> {
        Ok(self.count(query)? > 0)
    }

    /// Run the DELETE rendering of `query`; returns the affected rows.
    pub fn delete(&self, query: &QueryBuilder) -> DataResult<u64> {
        let sql = self.dialect.prepare_sql(&query.sql_delete()?);
        debug!(dialect = %self.dialect, sql = %sql, "delete");
        self.gateway.execute(&sql, query.params())
    }

    /// Next value of the sequence declared by `entity`.
    pub fn next_sequence_value(&self, entity: &str) -> DataResult<i64> {
        let descriptor = self.cache.descriptor(entity)?;
        let sequence = descriptor
            .sequence
            .as_deref()
            .ok_or_else(|| DataError::config(format!("{} declares no sequence", entity)))?;

        let sql = self.dialect.next_sequence_value(sequence);
        debug!(entity, sql = %sql, "next sequence value");
        let rows = self.gateway.query(&sql, &Params::new())?;
        rows.first()
            .and_then(|row| row.values().next())
            .and_then(|value| value.as_i64())
            .ok_or_else(|| DataError::Gateway(format!("sequence {} returned no value", sequence)))
    }

    /// Lazily page through the records of `query`, `page_size` rows per statement.
    ///
    /// Iteration starts at the query's offset and ignores its limit. An
    /// unsorted query is ordered by the entity's default order-by column, if
    /// it declares one.
    pub fn iterate<'a>(
        &'a self,
        query: &QueryBuilder,
        page_size: u64,
    ) -> DataResult<PageIter<Record, impl FnMut(u64, u64) -> DataResult<Vec<Record>> + 'a>> {
        let entity = query
            .entity()
            .ok_or_else(|| DataError::config("query is not mapped to an entity"))?;
        let mapper = self.cache.row_mapper(entity, query.is_load_all())?;

        let mut query = query.clone();
        if !query.is_sorted() {
            if let Some(column) = &self.cache.descriptor(entity)?.default_order_by {
                query.set_order_by(column, SortOrder::Ascending);
            }
        }
        let sql = self.dialect.prepare_sql(&query.sql());
        let params = query.params().clone();

        Ok(PageIter::starting_at(page_size, query.offset(), move |limit, offset| {
            let paged = self.dialect.paginate(&sql, limit, offset);
            debug!(dialect = %self.dialect, sql = %paged, "page");
            let rows = self.gateway.query(&paged, &params)?;
            mapper.map_rows(&rows)
        }))
    }
}
