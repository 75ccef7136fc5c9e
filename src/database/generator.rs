//! Dialect-specific SQL fragment generation
//!
//! [`SqlGenerator`] turns a fixed catalog of SQL construction intents into
//! text for the backend that is active when the method is called. Every
//! method resolves the backend exactly once, and a resolution failure is
//! returned as-is. Operations whose syntax differs between dialects return
//! [`Error::UnsupportedDialectOperation`] for a backend they have no rule
//! for; there is no generic fallback.
//!
//! Fragments are plain strings. Identifiers and values are trusted: the only
//! escaping performed is wrapping identifiers in the dialect's quote
//! characters.

use super::{ColumnType, DatabaseBackend, DialectResolver, Sort};
use crate::error::{Error, Result};
use crate::tenant::BusinessClock;
use chrono::NaiveDate;
use std::fmt::{self, Write};
use std::sync::Arc;

/// Format of dates embedded into SQL literals (`yyyy-MM-dd`)
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d";

/// Format of date-times embedded into SQL literals (`yyyy-MM-dd HH:mm:ss`)
pub const DEFAULT_DATE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Join flavours accepted by [`SqlGenerator::build_join`]
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum JoinType {
    /// Bare `JOIN`
    #[default]
    Plain,
    Inner,
    Left,
    Right,
    Full,
    Cross,
    /// Any other keyword placed before `JOIN`, e.g. `LEFT OUTER`
    Custom(String),
}

impl JoinType {
    /// Keyword placed before `JOIN`, if any
    pub fn keyword(&self) -> Option<&str> {
        match self {
            JoinType::Plain => None,
            JoinType::Inner => Some("INNER"),
            JoinType::Left => Some("LEFT"),
            JoinType::Right => Some("RIGHT"),
            JoinType::Full => Some("FULL"),
            JoinType::Cross => Some("CROSS"),
            JoinType::Custom(keyword) if keyword.trim().is_empty() => None,
            JoinType::Custom(keyword) => Some(keyword.trim()),
        }
    }
}

impl From<&str> for JoinType {
    fn from(value: &str) -> Self {
        match value.trim().to_uppercase().as_str() {
            "" => JoinType::Plain,
            "INNER" => JoinType::Inner,
            "LEFT" => JoinType::Left,
            "RIGHT" => JoinType::Right,
            "FULL" => JoinType::Full,
            "CROSS" => JoinType::Cross,
            _ => JoinType::Custom(value.trim().to_string()),
        }
    }
}

impl From<Option<&str>> for JoinType {
    fn from(value: Option<&str>) -> Self {
        value.map(JoinType::from).unwrap_or_default()
    }
}

/// Generates dialect-correct SQL fragments
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use sqldialect::database::{DatabaseBackend, FixedDialectResolver, SqlGenerator};
/// use sqldialect::tenant::SystemClock;
///
/// let generator = SqlGenerator::new(
///     Arc::new(FixedDialectResolver::new(DatabaseBackend::Postgres)),
///     Arc::new(SystemClock::new()),
/// );
/// assert_eq!(generator.limit_offset(5, 20).unwrap(), "LIMIT 5 OFFSET 20");
/// assert_eq!(generator.escape("users").unwrap(), "\"users\"");
/// ```
#[derive(Clone)]
pub struct SqlGenerator {
    resolver: Arc<dyn DialectResolver>,
    clock: Arc<dyn BusinessClock>,
    date_format: String,
    date_time_format: String,
}

impl fmt::Debug for SqlGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqlGenerator")
            .field("date_format", &self.date_format)
            .field("date_time_format", &self.date_time_format)
            .finish_non_exhaustive()
    }
}

impl SqlGenerator {
    pub fn new(resolver: Arc<dyn DialectResolver>, clock: Arc<dyn BusinessClock>) -> Self {
        Self {
            resolver,
            clock,
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            date_time_format: DEFAULT_DATE_TIME_FORMAT.to_string(),
        }
    }

    /// Override the chrono patterns used for date and date-time literals
    pub fn with_formats(
        mut self,
        date_format: impl Into<String>,
        date_time_format: impl Into<String>,
    ) -> Self {
        self.date_format = date_format.into();
        self.date_time_format = date_time_format.into();
        self
    }

    /// The backend the next fragment would be generated for
    pub fn current_backend(&self) -> Result<DatabaseBackend> {
        let backend = self.resolver.current_backend()?;
        log::trace!("Resolved database backend: {}", backend);
        Ok(backend)
    }

    fn unsupported(operation: &'static str, backend: DatabaseBackend) -> Error {
        log::error!(
            "Database type is not supported for {}: {}",
            operation,
            backend
        );
        Error::unsupported(operation, backend)
    }

    fn escape_for(backend: DatabaseBackend, identifier: &str) -> String {
        match backend {
            DatabaseBackend::MySQL | DatabaseBackend::MariaDB => format!("`{}`", identifier),
            DatabaseBackend::Postgres => format!("\"{}\"", identifier),
            _ => identifier.to_string(),
        }
    }

    /// Quote an identifier for the active backend
    ///
    /// Backends without a quoting rule get the identifier unchanged.
    pub fn escape(&self, identifier: &str) -> Result<String> {
        Ok(Self::escape_for(self.current_backend()?, identifier))
    }

    /// Render a literal for a column of the given type
    ///
    /// String and temporal columns are wrapped in single quotes; everything
    /// else is passed through. The value is not escaped.
    pub fn format_value(&self, column_type: ColumnType, value: &str) -> String {
        if column_type.needs_quoting() {
            format!("'{}'", value)
        } else {
            value.to_string()
        }
    }

    /// Comma-separated string aggregate
    pub fn group_concat(&self, expression: &str) -> Result<String> {
        match self.current_backend()? {
            DatabaseBackend::MySQL | DatabaseBackend::MariaDB => {
                Ok(format!("GROUP_CONCAT({})", expression))
            }
            // STRING_AGG only accepts text input
            DatabaseBackend::Postgres => Ok(format!("STRING_AGG({}::varchar, ',')", expression)),
            other => Err(Self::unsupported("group concat", other)),
        }
    }

    /// `LIMIT` with offset zero
    pub fn limit(&self, count: u64) -> Result<String> {
        self.limit_offset(count, 0)
    }

    pub fn limit_offset(&self, count: u64, offset: u64) -> Result<String> {
        match self.current_backend()? {
            DatabaseBackend::MySQL | DatabaseBackend::MariaDB => {
                Ok(format!("LIMIT {},{}", offset, count))
            }
            DatabaseBackend::Postgres => Ok(format!("LIMIT {} OFFSET {}", count, offset)),
            other => Err(Self::unsupported("limit", other)),
        }
    }

    /// Marker placed after `SELECT` so the total row count can be read back
    /// with [`count_last_executed_query_result`](Self::count_last_executed_query_result)
    pub fn calc_found_rows(&self) -> Result<String> {
        match self.current_backend()? {
            DatabaseBackend::MySQL | DatabaseBackend::MariaDB => {
                Ok("SQL_CALC_FOUND_ROWS".to_string())
            }
            _ => Ok(String::new()),
        }
    }

    /// Query returning the total row count of `sql`, which must be the
    /// statement that was just executed
    pub fn count_last_executed_query_result(&self, sql: &str) -> Result<String> {
        match self.current_backend()? {
            DatabaseBackend::MySQL | DatabaseBackend::MariaDB => {
                Ok("SELECT FOUND_ROWS()".to_string())
            }
            _ => Ok(Self::count_wrapper(sql)),
        }
    }

    /// Query counting the rows `sql` returns
    pub fn count_query_result(&self, sql: &str) -> String {
        Self::count_wrapper(sql)
    }

    fn count_wrapper(sql: &str) -> String {
        format!("SELECT COUNT(*) FROM ({}) AS temp", sql)
    }

    fn date_literal(
        &self,
        operation: &'static str,
        backend: DatabaseBackend,
        date: impl FnOnce() -> Result<NaiveDate>,
    ) -> Result<String> {
        let (open, close) = match backend {
            DatabaseBackend::MySQL | DatabaseBackend::MariaDB => ("DATE('", "')"),
            DatabaseBackend::Postgres => ("DATE '", "'"),
            other => return Err(Self::unsupported(operation, other)),
        };
        let formatted = render(date()?.format(&self.date_format), &self.date_format)?;
        Ok(format!("{}{}{}", open, formatted, close))
    }

    /// Date literal holding the tenant's business date
    pub fn current_business_date(&self) -> Result<String> {
        let backend = self.current_backend()?;
        self.date_literal("current date", backend, || self.clock.business_date())
    }

    /// Date literal holding today's date in the tenant's timezone
    pub fn current_tenant_date(&self) -> Result<String> {
        let backend = self.current_backend()?;
        self.date_literal("current date", backend, || Ok(self.clock.tenant_date()))
    }

    /// Timestamp literal holding the current time in the tenant's timezone
    pub fn current_tenant_date_time(&self) -> Result<String> {
        let (open, close) = match self.current_backend()? {
            DatabaseBackend::MySQL | DatabaseBackend::MariaDB => ("TIMESTAMP('", "')"),
            DatabaseBackend::Postgres => ("TIMESTAMP '", "'"),
            other => return Err(Self::unsupported("current date time", other)),
        };
        let now = self.clock.tenant_date_time();
        let formatted = render(now.format(&self.date_time_format), &self.date_time_format)?;
        Ok(format!("{}{}{}", open, formatted, close))
    }

    /// Subtract `multiplier` units from `date`; `unit` is emitted verbatim
    pub fn sub_date(&self, date: &str, multiplier: &str, unit: &str) -> Result<String> {
        match self.current_backend()? {
            DatabaseBackend::MySQL | DatabaseBackend::MariaDB => {
                Ok(format!("DATE_SUB({}, INTERVAL {} {})", date, multiplier, unit))
            }
            DatabaseBackend::Postgres => Ok(format!(
                "({}::TIMESTAMP - {} * INTERVAL '1 {}')",
                date, multiplier, unit
            )),
            other => Err(Self::unsupported("subtracting date", other)),
        }
    }

    /// Whole days between two date expressions
    pub fn date_diff(&self, date1: &str, date2: &str) -> Result<String> {
        match self.current_backend()? {
            DatabaseBackend::MySQL | DatabaseBackend::MariaDB => {
                Ok(format!("DATEDIFF({}, {})", date1, date2))
            }
            DatabaseBackend::Postgres => Ok(format!(
                "EXTRACT(DAY FROM ({}::TIMESTAMP - {}::TIMESTAMP))",
                date1, date2
            )),
            other => Err(Self::unsupported("date diff", other)),
        }
    }

    /// Last generated key on the current connection
    pub fn last_insert_id(&self) -> Result<String> {
        match self.current_backend()? {
            DatabaseBackend::MySQL | DatabaseBackend::MariaDB => Ok("LAST_INSERT_ID()".to_string()),
            DatabaseBackend::Postgres => Ok("LASTVAL()".to_string()),
            other => Err(Self::unsupported("last insert id", other)),
        }
    }

    pub fn cast_char(&self, sql: &str) -> Result<String> {
        match self.current_backend()? {
            DatabaseBackend::MySQL | DatabaseBackend::MariaDB => {
                Ok(format!("CAST({} AS CHAR)", sql))
            }
            DatabaseBackend::Postgres => Ok(format!("{}::CHAR", sql)),
            other => Err(Self::unsupported("casting to character", other)),
        }
    }

    pub fn cast_integer(&self, sql: &str) -> Result<String> {
        match self.current_backend()? {
            DatabaseBackend::MySQL | DatabaseBackend::MariaDB => {
                Ok(format!("CAST({} AS SIGNED INTEGER)", sql))
            }
            DatabaseBackend::Postgres => Ok(format!("{}::INTEGER", sql)),
            other => Err(Self::unsupported("casting to integer", other)),
        }
    }

    pub fn current_schema(&self) -> Result<String> {
        match self.current_backend()? {
            DatabaseBackend::MySQL | DatabaseBackend::MariaDB => Ok("SCHEMA()".to_string()),
            DatabaseBackend::Postgres => Ok("CURRENT_SCHEMA()".to_string()),
            other => Err(Self::unsupported("current schema", other)),
        }
    }

    /// MySQL JSON columns need no cast
    pub fn cast_json(&self, sql: &str) -> Result<String> {
        match self.current_backend()? {
            DatabaseBackend::MySQL | DatabaseBackend::MariaDB => Ok(sql.to_string()),
            DatabaseBackend::Postgres => Ok(format!("{} ::json", sql)),
            other => Err(Self::unsupported("casting to json", other)),
        }
    }

    /// Qualify `field` with `alias` when one is given
    pub fn alias(&self, field: &str, alias: Option<&str>) -> String {
        qualify(field, alias)
    }

    /// Select list over `fields`, each escaped and qualified with `alias`
    ///
    /// `embedded` drops the `SELECT` keyword so the list can be spliced into a
    /// hand-written statement. An empty field list yields an empty string.
    pub fn build_select<I, S>(
        &self,
        fields: I,
        alias: Option<&str>,
        embedded: bool,
    ) -> Result<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut fields = fields.into_iter().peekable();
        if fields.peek().is_none() {
            return Ok(String::new());
        }

        let backend = self.current_backend()?;
        let list = fields
            .map(|field| qualify(&Self::escape_for(backend, field.as_ref()), alias))
            .collect::<Vec<_>>()
            .join(", ");

        if embedded {
            Ok(list)
        } else {
            Ok(format!("SELECT {}", list))
        }
    }

    /// `FROM` clause over a table or view; `None` yields an empty string
    pub fn build_from(
        &self,
        definition: Option<&str>,
        alias: Option<&str>,
        embedded: bool,
    ) -> Result<String> {
        let Some(definition) = definition else {
            return Ok(String::new());
        };

        let backend = self.current_backend()?;
        let mut clause = Self::escape_for(backend, definition);
        if let Some(alias) = non_empty(alias) {
            clause.push(' ');
            clause.push_str(alias);
        }

        if embedded {
            Ok(clause)
        } else {
            Ok(format!("FROM {}", clause))
        }
    }

    /// Join `definition` (aliased `alias`) on `alias.fk_col = ref_alias.ref_col`
    ///
    /// # Example
    /// ```
    /// use std::sync::Arc;
    /// use sqldialect::database::{DatabaseBackend, FixedDialectResolver, JoinType, SqlGenerator};
    /// use sqldialect::tenant::SystemClock;
    ///
    /// let generator = SqlGenerator::new(
    ///     Arc::new(FixedDialectResolver::new(DatabaseBackend::MySQL)),
    ///     Arc::new(SystemClock::new()),
    /// );
    /// let join = generator
    ///     .build_join("m_client", Some("c"), "id", Some("l"), "client_id", JoinType::Left)
    ///     .unwrap();
    /// assert_eq!(join, "LEFT JOIN `m_client` c ON c.`id` = l.`client_id`");
    /// ```
    pub fn build_join(
        &self,
        definition: &str,
        alias: Option<&str>,
        fk_col: &str,
        ref_alias: Option<&str>,
        ref_col: &str,
        join_type: JoinType,
    ) -> Result<String> {
        let backend = self.current_backend()?;
        let join = match join_type.keyword() {
            Some(keyword) => format!("{} JOIN", keyword),
            None => "JOIN".to_string(),
        };
        let table_alias = non_empty(alias)
            .map(|a| format!(" {}", a))
            .unwrap_or_default();

        Ok(format!(
            "{} {}{} ON {} = {}",
            join,
            Self::escape_for(backend, definition),
            table_alias,
            qualify(&Self::escape_for(backend, fk_col), alias),
            qualify(&Self::escape_for(backend, ref_col), ref_alias)
        ))
    }

    /// `ORDER BY` clause in the order of `sort`; an empty sort yields an
    /// empty string
    pub fn build_order_by(
        &self,
        sort: &Sort,
        alias: Option<&str>,
        embedded: bool,
    ) -> Result<String> {
        if sort.is_empty() {
            return Ok(String::new());
        }

        let backend = self.current_backend()?;
        let list = sort
            .iter()
            .map(|order| {
                format!(
                    "{} {}",
                    qualify(&Self::escape_for(backend, &order.property), alias),
                    order.direction.as_sql()
                )
            })
            .collect::<Vec<_>>()
            .join(", ");

        if embedded {
            Ok(list)
        } else {
            Ok(format!("ORDER BY {}", list))
        }
    }
}

/// Render a chrono delayed format, surfacing a bad pattern as an error
/// instead of a formatting panic
fn render(formatted: impl fmt::Display, pattern: &str) -> Result<String> {
    let mut out = String::new();
    write!(out, "{}", formatted).map_err(|_| {
        Error::configuration(format!("Invalid date format pattern '{}'", pattern))
    })?;
    Ok(out)
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

fn qualify(field: &str, alias: Option<&str>) -> String {
    match non_empty(alias) {
        Some(alias) => format!("{}.{}", alias, field),
        None => field.to_string(),
    }
}
