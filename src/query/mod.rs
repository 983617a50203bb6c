//! Dynamic statement construction.
//!
//! ```rust
//! use querymap::query::{Comparator, QueryBuilder, SortOrder};
//!
//! let mut query = QueryBuilder::new("SELECT * FROM tbl_user");
//! query
//!     .add_condition("usr_status", "active", Comparator::Equal)
//!     .add_condition("usr_age", 0, Comparator::GreaterThan)
//!     .set_order_by("usr_name", SortOrder::Ascending);
//!
//! assert_eq!(
//!     query.sql(),
//!     "SELECT * FROM tbl_user WHERE UPPER(usr_status)=:usr_status_0 ORDER BY usr_name ASC"
//! );
//! ```

mod builder;
mod pager;
mod types;

pub use builder::QueryBuilder;
pub use pager::PageIter;
pub use types::{
    BuilderOptions, Comparator, Condition, DataType, GroupCondition, IsCheck, MatchMode, Operator,
    OrderBy, SortOrder,
};
