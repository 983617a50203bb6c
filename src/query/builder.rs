//! Dynamic query builder.
//!
//! A [`QueryBuilder`] accumulates WHERE, JOIN, ORDER BY and paging state on top
//! of a base SELECT, either raw SQL or the cached projection of a mapped entity.
//! Every emitted predicate consumes one slot of a monotonic index that suffixes
//! parameter names, so repeated filters on one column never collide.
//!
//! Absent values (see [`Value::is_present`]) are silently skipped, which lets
//! search forms pass possibly-unset fields straight through.

use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

use rand::{distr::Alphanumeric, Rng};
use regex::Regex;
use tracing::debug;

use super::types::{
    BuilderOptions, Comparator, Condition, DataType, GroupCondition, IsCheck, MatchMode, OrderBy,
    Operator, SortOrder,
};
use crate::cache::{AliasMap, MetadataCache, TranslationMap};
use crate::error::{DataError, DataResult};
use crate::metadata::JoinOperator;
use crate::value::{Params, Value};

static FROM_KEYWORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\sFROM\s").expect("valid FROM pattern"));

/// Mutable, single-use statement builder.
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    select: String,
    entity: Option<String>,
    load_all: bool,
    options: BuilderOptions,
    prefix: String,
    where_clause: String,
    params: Params,
    index: usize,
    joins: String,
    join_count: usize,
    order_by: Vec<(String, SortOrder)>,
    limit: Option<u64>,
    offset: u64,
    total_result_count: u64,
    translation: Option<Arc<TranslationMap>>,
    join_translation: HashMap<String, String>,
    alias_map: AliasMap,
    cache: Option<MetadataCache>,
}

impl QueryBuilder {
    /// Builder over a raw SELECT statement.
    pub fn new(sql: impl Into<String>) -> Self {
        let options = BuilderOptions::default();
        Self {
            select: sql.into(),
            entity: None,
            load_all: false,
            prefix: random_prefix(options.prefix_length),
            options,
            where_clause: String::new(),
            params: Params::new(),
            index: 0,
            joins: String::new(),
            join_count: 0,
            order_by: Vec::new(),
            limit: None,
            offset: 0,
            total_result_count: 0,
            translation: None,
            join_translation: HashMap::new(),
            alias_map: AliasMap::new(),
            cache: None,
        }
    }

    /// Builder over the cached base projection of `entity`.
    ///
    /// Property names passed to the builder are resolved through the entity's
    /// translation map; unknown names are used verbatim.
    pub fn for_entity(cache: &MetadataCache, entity: &str, load_all: bool) -> DataResult<Self> {
        let base = cache.sql_base(entity, load_all)?;
        let translation = cache.translation_map(entity)?;

        let mut builder = Self::new(base.sql.clone());
        builder.entity = Some(entity.to_string());
        builder.load_all = load_all;
        builder.alias_map = base.alias_map.clone();
        builder.translation = Some(translation);
        builder.cache = Some(cache.clone());
        Ok(builder)
    }

    /// Materialize results of a raw statement as `entity`.
    pub fn mapped_as(mut self, entity: &str, load_all: bool) -> Self {
        self.entity = Some(entity.to_string());
        self.load_all = load_all;
        self
    }

    pub fn with_options(mut self, options: BuilderOptions) -> Self {
        if options.prefix_length != self.prefix.len() {
            self.prefix = random_prefix(options.prefix_length);
        }
        self.options = options;
        self
    }

    // =========================================================================
    // Options and introspection
    // =========================================================================

    pub fn set_enable_uppercase_automatically(&mut self, enabled: bool) -> &mut Self {
        self.options.uppercase_automatically = enabled;
        self
    }

    pub fn set_enable_order_by_with_lower(&mut self, enabled: bool) -> &mut Self {
        self.options.order_by_with_lower = enabled;
        self
    }

    pub fn set_enable_prefix_param(&mut self, enabled: bool) -> &mut Self {
        self.options.prefix_param = enabled;
        self
    }

    /// Replace the random parameter prefix. Takes effect only while prefixing is enabled.
    pub fn set_prefix_param(&mut self, prefix: &str) -> &mut Self {
        self.prefix = prefix.to_string();
        self
    }

    pub fn set_clause_where_automatically(&mut self, enabled: bool) -> &mut Self {
        self.options.clause_where_automatically = enabled;
        self
    }

    pub fn options(&self) -> &BuilderOptions {
        &self.options
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn entity(&self) -> Option<&str> {
        self.entity.as_deref()
    }

    pub fn is_load_all(&self) -> bool {
        self.load_all
    }

    pub fn limit(&self) -> Option<u64> {
        self.limit
    }

    /// Non-positive limits are ignored.
    pub fn set_limit(&mut self, limit: i64) -> &mut Self {
        if limit > 0 {
            self.limit = Some(limit as u64);
        }
        self
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Non-positive offsets are ignored.
    pub fn set_offset(&mut self, offset: i64) -> &mut Self {
        if offset > 0 {
            self.offset = offset as u64;
        }
        self
    }

    pub fn is_limited(&self) -> bool {
        self.limit.is_some()
    }

    pub fn is_sorted(&self) -> bool {
        !self.order_by.is_empty()
    }

    pub fn total_result_count(&self) -> u64 {
        self.total_result_count
    }

    pub fn set_total_result_count(&mut self, count: u64) -> &mut Self {
        self.total_result_count = count;
        self
    }

    // =========================================================================
    // Predicates
    // =========================================================================

    /// `column <op> :param`, skipped when the value is absent.
    ///
    /// Dates compare by day: equality becomes a BETWEEN over the day's first
    /// and last second, other comparators cast the column with `::date`.
    pub fn add_condition(
        &mut self,
        column: &str,
        value: impl Into<Value>,
        comparator: Comparator,
    ) -> &mut Self {
        let column = self.real_name(column);
        self.condition(Operator::And, &column, &value.into(), comparator, false);
        self
    }

    /// Like [`add_condition`](Self::add_condition), but emitted even for absent values.
    pub fn add_condition_forced(
        &mut self,
        column: &str,
        value: impl Into<Value>,
        comparator: Comparator,
    ) -> &mut Self {
        let column = self.real_name(column);
        self.condition(Operator::And, &column, &value.into(), comparator, true);
        self
    }

    /// Case-insensitive "contains" match. `None` and blank text are skipped.
    pub fn add_condition_like<'a>(
        &mut self,
        column: &str,
        value: impl Into<Option<&'a str>>,
    ) -> &mut Self {
        self.add_condition_like_with(column, value, true, true)
    }

    pub fn add_condition_like_with<'a>(
        &mut self,
        column: &str,
        value: impl Into<Option<&'a str>>,
        percent_at_start: bool,
        percent_at_end: bool,
    ) -> &mut Self {
        let column = self.real_name(column);
        let value = value.into().map_or(Value::Null, Value::from);
        self.like(
            Operator::And,
            &column,
            &value,
            percent_at_start,
            percent_at_end,
        );
        self
    }

    /// Every space-separated token of `text` must match at least one of `columns`.
    pub fn add_condition_likes_smart(&mut self, columns: &[&str], text: &str) -> &mut Self {
        let tokens = non_blank_tokens(text.split(' '));
        self.likes_smart(columns, &tokens);
        self
    }

    /// [`add_condition_likes_smart`](Self::add_condition_likes_smart) with a custom split pattern.
    pub fn add_condition_likes_smart_split(
        &mut self,
        columns: &[&str],
        text: &str,
        split_pattern: &str,
    ) -> DataResult<&mut Self> {
        let pattern = Regex::new(split_pattern).map_err(|e| {
            DataError::invalid(format!("invalid split pattern '{}': {}", split_pattern, e))
        })?;
        let tokens = non_blank_tokens(pattern.split(text));
        self.likes_smart(columns, &tokens);
        Ok(self)
    }

    /// `column IN (:p0,:p1,...)`; a scalar is treated as a one-element list.
    pub fn add_condition_in(&mut self, column: &str, values: impl Into<Value>) -> &mut Self {
        let column = self.real_name(column);
        self.in_list(Operator::And, &column, &values.into());
        self
    }

    /// Skipped unless both bounds are non-null.
    pub fn add_condition_between(
        &mut self,
        column: &str,
        start: impl Into<Value>,
        end: impl Into<Value>,
    ) -> &mut Self {
        let column = self.real_name(column);
        self.between(Operator::And, &column, &start.into(), &end.into());
        self
    }

    pub fn add_condition_is(&mut self, column: &str, check: IsCheck) -> &mut Self {
        let column = self.real_name(column);
        self.push_operator(Operator::And);
        self.where_clause.push_str(&column);
        self.where_clause.push_str(check.as_sql());
        self.index += 1;
        self
    }

    /// Positional OR across `columns`, each compared with its own match mode.
    ///
    /// `None` values add nothing. Null slots are skipped and the group is
    /// parenthesized from the first to the last non-null slot.
    pub fn add_condition_or(
        &mut self,
        columns: &[&str],
        values: Option<&[Value]>,
        match_modes: &[MatchMode],
    ) -> DataResult<&mut Self> {
        let Some(values) = values else {
            return Ok(self);
        };
        if columns.len() != values.len() || columns.len() != match_modes.len() {
            return Err(DataError::invalid(format!(
                "{} columns, {} values and {} match modes given to an OR condition",
                columns.len(),
                values.len(),
                match_modes.len()
            )));
        }

        let slots: Vec<_> = columns
            .iter()
            .zip(values)
            .zip(match_modes)
            .map(|((column, value), mode)| (self.real_name(column), value, *mode))
            .collect();
        self.or_group(&slots)?;
        Ok(self)
    }

    /// Raw predicate ANDed in as is.
    pub fn add_custom_condition(&mut self, condition: &str) -> &mut Self {
        self.push_operator(Operator::And);
        self.where_clause.push_str(condition);
        self.index += 1;
        self
    }

    pub fn add_custom_condition_if(&mut self, condition: &str, apply: bool) -> &mut Self {
        if apply {
            self.add_custom_condition(condition);
        }
        self
    }

    /// Bind a parameter referenced by custom SQL without emitting any text.
    pub fn add_custom_param(&mut self, name: &str, value: impl Into<Value>) -> &mut Self {
        let name = self.parameter_name(name);
        let value = value.into().bind_form(self.options.uppercase_automatically);
        self.params.insert(name, value);
        self
    }

    /// `column <expression>` for each non-null value, ORed together.
    ///
    /// Every `${value}` in `expression` is replaced by the placeholder of a
    /// parameter bound to that value.
    pub fn add_condition_json(
        &mut self,
        column: &str,
        expression: &str,
        values: impl Into<Value>,
    ) -> &mut Self {
        let values = match values.into() {
            Value::List(items) => items,
            other => vec![other],
        };
        if values.iter().all(Value::is_null_or_blank) {
            return self;
        }
        let Some((left, right)) = non_null_span(values.iter()) else {
            return self;
        };

        let column = self.real_name(column);
        for (i, value) in values.iter().enumerate() {
            if value.is_null() {
                continue;
            }
            let name = self.indexed_name(&column);
            if self.has_to_include_operator() {
                self.where_clause
                    .push_str(if i == left { " AND " } else { " OR " });
            }
            if i == left {
                self.where_clause.push('(');
            }
            let predicate = expression.replace("${value}", &format!(":{}", name));
            self.where_clause
                .push_str(&format!("{} {}", column, predicate));
            if i == right {
                self.where_clause.push(')');
            }
            self.params.insert(name, value.bind_form(false));
            self.index += 1;
        }
        self
    }

    /// One group of ANDed conditions.
    pub fn add_group_condition(&mut self, group: &GroupCondition) -> DataResult<&mut Self> {
        self.add_group_conditions(std::slice::from_ref(group))
    }

    /// Groups of ANDed conditions, ORed together and ANDed with prior predicates.
    ///
    /// Every condition is checked against its data type before anything is
    /// rendered. Groups whose conditions are all absent disappear entirely.
    pub fn add_group_conditions(&mut self, groups: &[GroupCondition]) -> DataResult<&mut Self> {
        if groups.is_empty() {
            return Ok(self);
        }
        for condition in groups.iter().flat_map(|g| &g.conditions) {
            check_condition(condition)?;
            for alternative in &condition.alternatives {
                check_condition(alternative)?;
            }
        }

        let start = self.where_clause.len();
        self.where_clause
            .push_str(if self.index == 0 { "(" } else { " AND (" });

        let mut emitted = false;
        for group in groups {
            let mark = self.where_clause.len();
            let before = self.index;
            if emitted {
                self.where_clause.push_str(" OR ");
            }
            self.where_clause.push('(');
            for condition in &group.conditions {
                if condition.alternatives.is_empty() {
                    let column = self.real_name(&condition.column);
                    self.match_mode(
                        Operator::And,
                        &column,
                        &condition.value,
                        condition.match_mode,
                    )?;
                } else {
                    let slots: Vec<_> = std::iter::once(condition)
                        .chain(&condition.alternatives)
                        .map(|c| (self.real_name(&c.column), &c.value, c.match_mode))
                        .collect();
                    self.or_group(&slots)?;
                }
            }
            self.where_clause.push(')');

            if self.index == before {
                self.where_clause.truncate(mark);
            } else {
                emitted = true;
            }
        }

        if emitted {
            self.where_clause.push(')');
        } else {
            self.where_clause.truncate(start);
        }
        Ok(self)
    }

    // =========================================================================
    // Joins
    // =========================================================================

    /// Join `entity` on `foreign_key`, a property or column of the joined entity.
    pub fn add_join_table(
        &mut self,
        operator: JoinOperator,
        entity: &str,
        foreign_key: &str,
    ) -> DataResult<&mut Self> {
        self.add_join_table_as(operator, None, entity, foreign_key)
    }

    /// Like [`add_join_table`](Self::add_join_table) with an explicit alias.
    ///
    /// Properties of the joined entity become addressable as `alias.property`.
    pub fn add_join_table_as(
        &mut self,
        operator: JoinOperator,
        alias: Option<&str>,
        entity: &str,
        foreign_key: &str,
    ) -> DataResult<&mut Self> {
        let (Some(cache), Some(base_entity)) = (self.cache.clone(), self.entity.clone()) else {
            return Err(DataError::config(format!(
                "cannot join {}: builder was not created for a mapped entity",
                entity
            )));
        };

        let base = cache.descriptor(&base_entity)?;
        let base_table = base.table_name().ok_or_else(|| {
            DataError::config(format!("entity {} is not backed by a table", base.name))
        })?;
        let base_key = base.keys.first().ok_or_else(|| {
            DataError::config(format!("table {} has no primary key defined", base_table))
        })?;
        let base_alias = self
            .alias_map
            .get(base_table)
            .map(String::as_str)
            .unwrap_or("t1");
        let primary_key = format!("{}.{}", base_alias, base_key);

        let joined = cache.descriptor(entity)?;
        let joined_table = joined
            .table_name()
            .ok_or_else(|| {
                DataError::config(format!("entity {} is not backed by a table", joined.name))
            })?
            .to_string();
        if joined.keys.len() != 1 {
            return Err(DataError::config(format!(
                "joined table {} must declare exactly one primary key, found {}",
                joined_table,
                joined.keys.len()
            )));
        }
        let translation = cache.translation_map(entity)?;

        let alias = match alias.map(str::trim).filter(|a| !a.is_empty()) {
            Some(alias) => alias.to_string(),
            None => {
                self.join_count += 1;
                format!("jt{}", self.join_count)
            }
        };
        self.alias_map.insert(joined_table.clone(), alias.clone());
        for (property, column) in translation.iter() {
            self.join_translation
                .insert(format!("{}.{}", alias, property), column.clone());
        }

        let foreign_key = self.real_name(&format!("{}.{}", alias, foreign_key));
        self.joins.push_str(&format!(
            " {} {} {} ON {}={}",
            operator.as_sql(),
            joined_table,
            alias,
            primary_key,
            foreign_key
        ));
        debug!(entity, alias = %alias, "added join table");
        Ok(self)
    }

    // =========================================================================
    // Ordering
    // =========================================================================

    pub fn set_order_by(&mut self, column: &str, sort: SortOrder) -> &mut Self {
        self.order_by = vec![(self.real_name(column), sort)];
        self
    }

    /// Order by `columns`, pairing each with the sort order at the same position.
    pub fn set_order_by_columns(
        &mut self,
        columns: &[&str],
        sorts: &[SortOrder],
    ) -> DataResult<&mut Self> {
        if columns.len() != sorts.len() {
            return Err(DataError::invalid(format!(
                "{} order-by columns given with {} sort orders",
                columns.len(),
                sorts.len()
            )));
        }
        self.order_by = columns
            .iter()
            .zip(sorts)
            .map(|(column, sort)| (self.real_name(column), *sort))
            .collect();
        Ok(self)
    }

    /// Order by every column in the same direction.
    pub fn set_order_by_all(&mut self, columns: &[&str], sort: SortOrder) -> &mut Self {
        self.order_by = columns
            .iter()
            .map(|column| (self.real_name(column), sort))
            .collect();
        self
    }

    /// Order by `column` when given and non-blank, else by `default_column`.
    pub fn set_order_by_or_default(
        &mut self,
        column: Option<&str>,
        default_column: &str,
        sort: SortOrder,
    ) -> &mut Self {
        let column = column
            .filter(|c| !c.trim().is_empty())
            .unwrap_or(default_column);
        self.set_order_by(column, sort)
    }

    /// Ordering from request terms; an empty list keeps the current ordering.
    pub fn set_order_by_list(&mut self, orders: &[OrderBy]) -> &mut Self {
        if !orders.is_empty() {
            self.order_by = orders
                .iter()
                .map(|order| (self.real_name(&order.column), order.sort))
                .collect();
        }
        self
    }

    // =========================================================================
    // Rendering
    // =========================================================================

    /// The SELECT statement with joins, predicates and ordering.
    pub fn sql(&self) -> String {
        let mut sql = self.select.clone();
        sql.push_str(&self.joins);
        self.push_where(&mut sql);

        if !self.order_by.is_empty() {
            let terms: Vec<String> = self
                .order_by
                .iter()
                .map(|(column, sort)| {
                    if self.options.order_by_with_lower {
                        format!("LOWER({}) {}", column, sort.as_sql())
                    } else {
                        format!("{} {}", column, sort.as_sql())
                    }
                })
                .collect();
            sql.push_str(" ORDER BY ");
            sql.push_str(&terms.join(", "));
        }
        sql
    }

    /// `SELECT count(*)` over the same FROM, joins and predicates.
    pub fn sql_count(&self) -> DataResult<String> {
        self.with_verb("SELECT count(*)")
    }

    /// `DELETE` over the same FROM, joins and predicates.
    pub fn sql_delete(&self) -> DataResult<String> {
        self.with_verb("DELETE")
    }

    fn with_verb(&self, verb: &str) -> DataResult<String> {
        let from = FROM_KEYWORD.find(&self.select).ok_or_else(|| {
            DataError::invalid(format!("no FROM keyword in base statement: {}", self.select))
        })?;
        let mut sql = format!("{}{}", verb, &self.select[from.start()..]);
        sql.push_str(&self.joins);
        self.push_where(&mut sql);
        Ok(sql)
    }

    fn push_where(&self, sql: &mut String) {
        if self.index > 0 {
            sql.push_str(" WHERE ");
            sql.push_str(&self.where_clause);
        }
    }

    // =========================================================================
    // Internals
    // =========================================================================

    /// Resolve a property through the join and entity translation maps, then
    /// swap a declared table name for its alias.
    fn real_name(&self, column: &str) -> String {
        let full = self
            .join_translation
            .get(column)
            .or_else(|| self.translation.as_ref().and_then(|t| t.get(column)))
            .map(String::as_str)
            .unwrap_or(column);

        match full.split_once('.') {
            Some((table, name)) => match self.alias_map.get(table) {
                Some(alias) => format!("{}.{}", alias, name),
                None => full.to_string(),
            },
            None => full.to_string(),
        }
    }

    fn parameter_name(&self, input: &str) -> String {
        if self.options.prefix_param {
            format!("{}_{}", self.prefix, input)
        } else {
            input.to_string()
        }
    }

    fn indexed_name(&self, column: &str) -> String {
        self.parameter_name(&format!("{}_{}", column, self.index))
    }

    fn has_to_include_operator(&self) -> bool {
        self.index > 0 && !self.where_clause.ends_with('(')
    }

    fn push_operator(&mut self, operator: Operator) {
        if self.has_to_include_operator() {
            self.where_clause.push_str(operator.sentence());
        }
    }

    fn text_column(&self, column: &str) -> String {
        if self.options.uppercase_automatically {
            format!("UPPER({})", column)
        } else {
            column.to_string()
        }
    }

    fn condition(
        &mut self,
        operator: Operator,
        column: &str,
        value: &Value,
        comparator: Comparator,
        force: bool,
    ) {
        if !force && !value.is_present() {
            return;
        }
        let name = self.indexed_name(column);
        self.push_operator(operator);

        match value {
            Value::Date(date) if comparator == Comparator::Equal => {
                let day = date.format("%Y-%m-%d").to_string();
                let start = format!("{}_start", name);
                let end = format!("{}_end", name);
                self.where_clause.push_str(&format!(
                    "{} BETWEEN TO_TIMESTAMP(:{}, 'YYYY-MM-DD') AND TO_TIMESTAMP(:{}, 'YYYY-MM-DD HH24:MI:SS')",
                    column, start, end
                ));
                self.params
                    .insert(end, Value::Text(format!("{} 23:59:59", day)));
                self.params.insert(start, Value::Text(day));
            }
            Value::Date(_) => {
                self.where_clause
                    .push_str(&format!("{}::date{}:{}", column, comparator, name));
                self.params.insert(name, value.clone());
            }
            Value::DateTime(datetime) => {
                self.where_clause.push_str(&format!(
                    "{}{}TO_TIMESTAMP(:{}, 'YYYY-MM-DD HH24:MI:SS')",
                    column, comparator, name
                ));
                self.params.insert(
                    name,
                    Value::Text(datetime.format("%Y-%m-%d %H:%M:%S").to_string()),
                );
            }
            Value::Text(_) => {
                let target = self.text_column(column);
                self.where_clause
                    .push_str(&format!("{}{}:{}", target, comparator, name));
                self.params
                    .insert(name, value.bind_form(self.options.uppercase_automatically));
            }
            other => {
                self.where_clause
                    .push_str(&format!("{}{}:{}", column, comparator, name));
                self.params.insert(name, other.bind_form(false));
            }
        }
        self.index += 1;
    }

    fn like(
        &mut self,
        operator: Operator,
        column: &str,
        value: &Value,
        percent_at_start: bool,
        percent_at_end: bool,
    ) {
        let text = match value {
            Value::Null => return,
            Value::Text(s) => s.trim().to_string(),
            other => other.to_string().trim().to_string(),
        };
        if text.is_empty() {
            return;
        }

        let name = self.indexed_name(column);
        self.push_operator(operator);
        let target = self.text_column(column);
        self.where_clause.push_str(&format!(
            "{} LIKE {}:{}{}",
            target,
            if percent_at_start { "'%'||" } else { "" },
            name,
            if percent_at_end { "||'%'" } else { "" }
        ));

        let bound = if self.options.uppercase_automatically {
            text.to_uppercase()
        } else {
            text
        };
        self.params.insert(name, Value::Text(bound));
        self.index += 1;
    }

    fn likes_smart(&mut self, columns: &[&str], tokens: &[String]) {
        if tokens.is_empty() || columns.is_empty() {
            return;
        }
        let has_where = self.index > 0;
        let columns: Vec<String> = columns.iter().map(|c| self.real_name(c)).collect();

        let mut internal = String::new();
        for (i, token) in tokens.iter().enumerate() {
            internal.push_str(if i == 0 { "(" } else { " AND (" });
            for (j, column) in columns.iter().enumerate() {
                let name = self.indexed_name(column);
                if j > 0 {
                    internal.push_str(" OR ");
                }
                internal.push_str(&format!(
                    "{} LIKE '%'||:{}||'%'",
                    self.text_column(column),
                    name
                ));
                self.params
                    .insert(name, Value::Text(token.trim().to_uppercase()));
                self.index += 1;
            }
            internal.push(')');
        }

        if !(self.options.clause_where_automatically && !has_where) {
            self.where_clause.push_str(" AND ");
        }
        self.where_clause.push('(');
        self.where_clause.push_str(&internal);
        self.where_clause.push(')');
    }

    fn in_list(&mut self, operator: Operator, column: &str, value: &Value) {
        let values: Vec<&Value> = match value {
            Value::List(items) => items.iter().filter(|v| !v.is_null_or_blank()).collect(),
            other if !other.is_null_or_blank() => vec![other],
            _ => Vec::new(),
        };
        let Some(first) = values.first() else {
            return;
        };

        let uppercase = self.options.uppercase_automatically;
        let target = if matches!(first, Value::Text(_)) {
            self.text_column(column)
        } else {
            column.to_string()
        };
        self.push_operator(operator);
        self.where_clause.push_str(&target);
        self.where_clause.push_str(" IN (");
        for (i, value) in values.iter().enumerate() {
            let name = self.indexed_name(column);
            if i > 0 {
                self.where_clause.push(',');
            }
            self.where_clause.push(':');
            self.where_clause.push_str(&name);
            self.params.insert(name, value.bind_form(uppercase));
            self.index += 1;
        }
        self.where_clause.push(')');
    }

    fn between(&mut self, operator: Operator, column: &str, start: &Value, end: &Value) {
        if start.is_null() || end.is_null() {
            return;
        }
        let start_name = self.parameter_name(&format!("{}_{}_start", column, self.index));
        let end_name = self.parameter_name(&format!("{}_{}_end", column, self.index));

        self.push_operator(operator);
        self.where_clause.push_str(&format!(
            "{} BETWEEN :{} AND :{}",
            column, start_name, end_name
        ));
        self.params.insert(start_name, start.bind_form(false));
        self.params.insert(end_name, end.bind_form(false));
        self.index += 1;
    }

    fn match_mode(
        &mut self,
        operator: Operator,
        column: &str,
        value: &Value,
        mode: MatchMode,
    ) -> DataResult<()> {
        if let Some((start, end)) = mode.like_wildcards() {
            self.like(operator, column, value, start, end);
            return Ok(());
        }
        match mode {
            MatchMode::In => self.in_list(operator, column, value),
            MatchMode::Between => {
                let (start, end) = between_bounds(column, value)?;
                self.between(operator, column, start, end);
            }
            _ => {
                if let Some(comparator) = mode.comparator() {
                    self.condition(operator, column, value, comparator, false);
                }
            }
        }
        Ok(())
    }

    fn or_group(&mut self, slots: &[(String, &Value, MatchMode)]) -> DataResult<()> {
        for (column, value, mode) in slots {
            if *mode == MatchMode::Between && !value.is_null() {
                between_bounds(column, value)?;
            }
        }
        if slots.iter().all(|(_, value, _)| value.is_null_or_blank()) {
            return Ok(());
        }
        let Some((left, right)) = non_null_span(slots.iter().map(|(_, value, _)| *value)) else {
            return Ok(());
        };

        let start = self.where_clause.len();
        let before = self.index;
        self.push_operator(Operator::And);
        for (i, (column, value, mode)) in slots.iter().enumerate() {
            if i == left {
                self.where_clause.push('(');
            }
            if !value.is_null() {
                self.match_mode(Operator::Or, column, value, *mode)?;
            }
            if i == right {
                self.where_clause.push(')');
            }
        }

        if self.index == before {
            self.where_clause.truncate(start);
        }
        Ok(())
    }
}

fn random_prefix(length: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}

fn non_blank_tokens<'a>(pieces: impl Iterator<Item = &'a str>) -> Vec<String> {
    pieces
        .filter(|token| !token.trim().is_empty())
        .map(str::to_string)
        .collect()
}

/// Positions of the first and last non-null value.
fn non_null_span<'a>(values: impl Iterator<Item = &'a Value>) -> Option<(usize, usize)> {
    let present: Vec<usize> = values
        .enumerate()
        .filter(|(_, v)| !v.is_null())
        .map(|(i, _)| i)
        .collect();
    Some((*present.first()?, *present.last()?))
}

fn between_bounds<'a>(column: &str, value: &'a Value) -> DataResult<(&'a Value, &'a Value)> {
    match value.as_list() {
        Some([start, end]) => Ok((start, end)),
        _ => Err(DataError::invalid(format!(
            "BETWEEN on {} requires a list of two values, got {}",
            column, value
        ))),
    }
}

fn check_condition(condition: &Condition) -> DataResult<()> {
    if !condition.data_type.supports(condition.match_mode) {
        return Err(DataError::config(format!(
            "match mode {:?} is not supported with data type {:?}",
            condition.match_mode, condition.data_type
        )));
    }
    if condition.data_type == DataType::Date
        && !matches!(
            condition.value,
            Value::Null | Value::Date(_) | Value::DateTime(_) | Value::List(_)
        )
    {
        return Err(DataError::invalid(format!(
            "data type DATE cannot be applied to {} on {}",
            condition.value, condition.column
        )));
    }
    if condition.match_mode == MatchMode::Between && !condition.value.is_null() {
        between_bounds(&condition.column, &condition.value)?;
    }
    Ok(())
}
