//! Database backend identifiers
//!
//! A backend names the SQL dialect spoken by a tenant's database. MySQL and
//! MariaDB share the MySQL-family rules; PostgreSQL is the only member of the
//! PostgreSQL family. SQLite is recognised so that deployments pointing at it
//! get a precise error instead of borrowing another family's syntax.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Database backend types known to the generator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseBackend {
    #[serde(alias = "postgresql")]
    Postgres,
    MySQL,
    MariaDB,
    SQLite,
}

impl DatabaseBackend {
    /// All known backends, in declaration order
    pub const ALL: [DatabaseBackend; 4] = [
        DatabaseBackend::Postgres,
        DatabaseBackend::MySQL,
        DatabaseBackend::MariaDB,
        DatabaseBackend::SQLite,
    ];

    /// MySQL and MariaDB
    pub fn is_mysql_family(&self) -> bool {
        matches!(self, DatabaseBackend::MySQL | DatabaseBackend::MariaDB)
    }

    pub fn is_postgres_family(&self) -> bool {
        matches!(self, DatabaseBackend::Postgres)
    }

    /// Lowercase backend name, identical to the serde representation
    pub fn name(&self) -> &'static str {
        match self {
            DatabaseBackend::Postgres => "postgres",
            DatabaseBackend::MySQL => "mysql",
            DatabaseBackend::MariaDB => "mariadb",
            DatabaseBackend::SQLite => "sqlite",
        }
    }

    /// Detect the backend from a connection URL scheme
    ///
    /// # Example
    /// ```
    /// use sqldialect::DatabaseBackend;
    ///
    /// let backend = DatabaseBackend::from_url("postgresql://localhost/fineract").unwrap();
    /// assert_eq!(backend, DatabaseBackend::Postgres);
    /// ```
    pub fn from_url(url: &str) -> Result<Self> {
        if url.starts_with("postgresql://") || url.starts_with("postgres://") {
            Ok(DatabaseBackend::Postgres)
        } else if url.starts_with("mysql://") {
            Ok(DatabaseBackend::MySQL)
        } else if url.starts_with("mariadb://") {
            Ok(DatabaseBackend::MariaDB)
        } else if url.starts_with("sqlite://") || url.starts_with("sqlite:") {
            Ok(DatabaseBackend::SQLite)
        } else {
            Err(Error::unknown_backend(format!(
                "Unsupported database URL scheme: {}",
                url
            )))
        }
    }
}

impl fmt::Display for DatabaseBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DatabaseBackend {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Ok(DatabaseBackend::Postgres),
            "mysql" => Ok(DatabaseBackend::MySQL),
            "mariadb" => Ok(DatabaseBackend::MariaDB),
            "sqlite" | "sqlite3" => Ok(DatabaseBackend::SQLite),
            other => Err(Error::unknown_backend(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_families() {
        assert!(DatabaseBackend::MySQL.is_mysql_family());
        assert!(DatabaseBackend::MariaDB.is_mysql_family());
        assert!(!DatabaseBackend::Postgres.is_mysql_family());
        assert!(DatabaseBackend::Postgres.is_postgres_family());
        assert!(!DatabaseBackend::SQLite.is_mysql_family());
        assert!(!DatabaseBackend::SQLite.is_postgres_family());
    }

    #[test]
    fn test_from_url() {
        assert_eq!(
            DatabaseBackend::from_url("postgres://localhost/db").unwrap(),
            DatabaseBackend::Postgres
        );
        assert_eq!(
            DatabaseBackend::from_url("mariadb://root@localhost:3306/fineract_default").unwrap(),
            DatabaseBackend::MariaDB
        );
        assert_eq!(
            DatabaseBackend::from_url("sqlite::memory:").unwrap(),
            DatabaseBackend::SQLite
        );
        assert!(DatabaseBackend::from_url("oracle://db").is_err());
    }

    #[test]
    fn test_from_str_aliases() {
        assert_eq!(
            "PostgreSQL".parse::<DatabaseBackend>().unwrap(),
            DatabaseBackend::Postgres
        );
        assert_eq!(
            " MySQL ".parse::<DatabaseBackend>().unwrap(),
            DatabaseBackend::MySQL
        );
        let err = "oracle".parse::<DatabaseBackend>().unwrap_err();
        assert_eq!(err.error_code(), "E_UNKNOWN_BACKEND");
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&DatabaseBackend::MariaDB).unwrap();
        assert_eq!(json, "\"mariadb\"");
        let backend: DatabaseBackend = serde_json::from_str("\"postgresql\"").unwrap();
        assert_eq!(backend, DatabaseBackend::Postgres);
        assert_eq!(DatabaseBackend::SQLite.to_string(), "sqlite");
    }
}
