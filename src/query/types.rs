//! Value types consumed by the query builder.

use serde::{Deserialize, Serialize};

use crate::value::Value;

/// Binary comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Comparator {
    Equal,
    LessThan,
    LessOrEqual,
    GreaterThan,
    GreaterOrEqual,
    NotEqual,
}

impl Comparator {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Comparator::Equal => "=",
            Comparator::LessThan => "<",
            Comparator::LessOrEqual => "<=",
            Comparator::GreaterThan => ">",
            Comparator::GreaterOrEqual => ">=",
            Comparator::NotEqual => "<>",
        }
    }
}

impl std::fmt::Display for Comparator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// How a structured or positional condition compares its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchMode {
    Equal,
    LessThan,
    LessOrEqual,
    GreaterThan,
    GreaterOrEqual,
    NotEqual,
    TextContains,
    TextStartsWith,
    TextEndsWith,
    In,
    Between,
}

impl MatchMode {
    /// The plain comparator this mode renders as, if any.
    pub fn comparator(&self) -> Option<Comparator> {
        match self {
            MatchMode::Equal => Some(Comparator::Equal),
            MatchMode::LessThan => Some(Comparator::LessThan),
            MatchMode::LessOrEqual => Some(Comparator::LessOrEqual),
            MatchMode::GreaterThan => Some(Comparator::GreaterThan),
            MatchMode::GreaterOrEqual => Some(Comparator::GreaterOrEqual),
            MatchMode::NotEqual => Some(Comparator::NotEqual),
            MatchMode::TextContains
            | MatchMode::TextStartsWith
            | MatchMode::TextEndsWith
            | MatchMode::In
            | MatchMode::Between => None,
        }
    }

    /// Percent placement `(at_start, at_end)` for the LIKE modes.
    pub(crate) fn like_wildcards(&self) -> Option<(bool, bool)> {
        match self {
            MatchMode::TextContains => Some((true, true)),
            MatchMode::TextEndsWith => Some((true, false)),
            MatchMode::TextStartsWith => Some((false, true)),
            _ => None,
        }
    }
}

/// Declared type of a structured condition, restricting its match modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DataType {
    Alphanumeric,
    Numeric,
    Date,
}

impl DataType {
    pub fn match_modes(&self) -> &'static [MatchMode] {
        use MatchMode::*;
        match self {
            DataType::Alphanumeric => &[
                Equal,
                NotEqual,
                TextContains,
                TextStartsWith,
                TextEndsWith,
                In,
            ],
            DataType::Numeric => &[
                Equal,
                LessThan,
                LessOrEqual,
                GreaterThan,
                GreaterOrEqual,
                NotEqual,
                In,
                Between,
            ],
            DataType::Date => &[
                Equal,
                LessThan,
                LessOrEqual,
                GreaterThan,
                GreaterOrEqual,
                NotEqual,
                Between,
            ],
        }
    }

    pub fn supports(&self, mode: MatchMode) -> bool {
        self.match_modes().contains(&mode)
    }
}

/// Null check for `add_condition_is`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IsCheck {
    Null,
    NotNull,
}

impl IsCheck {
    pub fn as_sql(&self) -> &'static str {
        match self {
            IsCheck::Null => " IS NULL",
            IsCheck::NotNull => " IS NOT NULL",
        }
    }
}

/// Connective placed before a predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    And,
    Or,
}

impl Operator {
    pub fn sentence(&self) -> &'static str {
        match self {
            Operator::And => " AND ",
            Operator::Or => " OR ",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

impl SortOrder {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortOrder::Ascending => "ASC",
            SortOrder::Descending => "DESC",
        }
    }
}

/// One ordering term, typically deserialized from a search request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBy {
    pub column: String,
    #[serde(default)]
    pub sort: SortOrder,
}

impl OrderBy {
    pub fn new(column: &str, sort: SortOrder) -> Self {
        Self {
            column: column.to_string(),
            sort,
        }
    }
}

/// A structured condition, optionally ORed with alternatives.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub column: String,
    pub value: Value,
    pub data_type: DataType,
    pub match_mode: MatchMode,
    pub alternatives: Vec<Condition>,
}

impl Condition {
    pub fn new(
        column: &str,
        value: impl Into<Value>,
        data_type: DataType,
        match_mode: MatchMode,
    ) -> Self {
        Self {
            column: column.to_string(),
            value: value.into(),
            data_type,
            match_mode,
            alternatives: Vec::new(),
        }
    }

    /// Add a condition ORed with this one.
    pub fn or(mut self, alternative: Condition) -> Self {
        self.alternatives.push(alternative);
        self
    }
}

/// Conditions ANDed together; several groups are ORed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupCondition {
    pub conditions: Vec<Condition>,
}

impl GroupCondition {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn add_condition(&mut self, condition: Condition) {
        self.conditions.push(condition);
    }
}

impl From<Vec<Condition>> for GroupCondition {
    fn from(conditions: Vec<Condition>) -> Self {
        Self { conditions }
    }
}

/// Rendering options of a builder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuilderOptions {
    /// Compare text case-insensitively through `UPPER(col)` and upper-cased values.
    pub uppercase_automatically: bool,
    /// Order by `LOWER(col)`.
    pub order_by_with_lower: bool,
    /// Prefix parameter names with a per-builder random token.
    pub prefix_param: bool,
    pub prefix_length: usize,
    /// Start the smart-like group without a connective when it is the first predicate.
    pub clause_where_automatically: bool,
}

impl Default for BuilderOptions {
    fn default() -> Self {
        Self {
            uppercase_automatically: true,
            order_by_with_lower: false,
            prefix_param: false,
            prefix_length: 5,
            clause_where_automatically: true,
        }
    }
}
