//! sqldialect - dialect-aware SQL fragment generation
//!
//! sqldialect builds the SQL pieces a persistence layer needs (select lists,
//! joins, ORDER BY, LIMIT, date arithmetic, casts, aggregates) for whichever
//! backend the current tenant runs on:
//! - MySQL-family (MySQL, MariaDB) and PostgreSQL-family rules
//! - Per-call backend resolution for multi-tenant deployments
//! - Explicit business-date and tenant-date clocks
//! - Fail-fast errors for operations a backend has no rule for

// Enforce error handling best practices
#![cfg_attr(
    not(test),
    warn(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::panic,
        clippy::unimplemented,
        clippy::todo,
    )
)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used,))]

#[cfg(feature = "config")]
pub mod config;
pub mod database;
pub mod error;
pub mod tenant;

// Re-export main types for public API
#[cfg(feature = "config")]
pub use config::SqlDialectConfig;
pub use database::{
    ColumnType, DatabaseBackend, DialectResolver, FixedDialectResolver, JoinType, OrderDirection,
    Sort, SortOrder, SqlGenerator, TenantDialectResolver,
};
pub use error::{Error, Result};
pub use tenant::{
    ActionContext, BusinessClock, BusinessDateType, ExecutionContext, FixedClock, SystemClock,
    TenantContext,
};

/// Prelude module for common imports
pub mod prelude {
    pub use crate::database::*;
    pub use crate::error::{Error, Result};
    pub use crate::tenant::*;

    #[cfg(feature = "config")]
    pub use crate::config::SqlDialectConfig;
}
