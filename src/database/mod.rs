//! Dialect-aware SQL generation
//!
//! This module holds the backend identifiers, the column type classifier,
//! sort specifications, dialect resolvers and the [`SqlGenerator`] that ties
//! them together.

pub mod backend;
pub mod column_type;
pub mod generator;
pub mod resolver;
pub mod sort;

// Re-export main types for convenience
pub use backend::DatabaseBackend;
pub use column_type::ColumnType;
pub use generator::{JoinType, SqlGenerator, DEFAULT_DATE_FORMAT, DEFAULT_DATE_TIME_FORMAT};
pub use resolver::{DialectResolver, FixedDialectResolver, TenantDialectResolver};
pub use sort::{OrderDirection, Sort, SortOrder};
