//! Column type classification
//!
//! A [`ColumnType`] tags the column a literal value belongs to. The generator
//! only looks at it to decide whether the literal has to be quoted; it never
//! converts the value itself.

use serde::{Deserialize, Serialize};

/// JDBC-style column type tags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    // Boolean
    Bit,
    Boolean,

    // Numeric
    TinyInt,
    SmallInt,
    Integer,
    BigInt,
    Real,
    Float,
    Double,
    Numeric,
    Decimal,

    // Character
    Char,
    Varchar,
    LongVarchar,
    Text,
    NChar,
    NVarchar,
    Clob,

    // Temporal
    Date,
    Time,
    TimeWithTimezone,
    Timestamp,
    TimestampWithTimezone,

    // Binary
    Binary,
    Varbinary,
    Blob,

    // Other
    Json,
    Jsonb,
    Uuid,
    Other,
}

impl ColumnType {
    pub fn is_string_type(&self) -> bool {
        matches!(
            self,
            ColumnType::Char
                | ColumnType::Varchar
                | ColumnType::LongVarchar
                | ColumnType::Text
                | ColumnType::NChar
                | ColumnType::NVarchar
                | ColumnType::Clob
        )
    }

    pub fn is_date_type(&self) -> bool {
        matches!(self, ColumnType::Date)
    }

    pub fn is_time_type(&self) -> bool {
        matches!(self, ColumnType::Time | ColumnType::TimeWithTimezone)
    }

    pub fn is_timestamp_type(&self) -> bool {
        matches!(
            self,
            ColumnType::Timestamp | ColumnType::TimestampWithTimezone
        )
    }

    /// Date, time and timestamp columns, with or without zone
    pub fn is_any_date_type(&self) -> bool {
        self.is_date_type() || self.is_time_type() || self.is_timestamp_type()
    }

    pub fn is_numeric_type(&self) -> bool {
        matches!(
            self,
            ColumnType::TinyInt
                | ColumnType::SmallInt
                | ColumnType::Integer
                | ColumnType::BigInt
                | ColumnType::Real
                | ColumnType::Float
                | ColumnType::Double
                | ColumnType::Numeric
                | ColumnType::Decimal
        )
    }

    pub fn is_binary_type(&self) -> bool {
        matches!(
            self,
            ColumnType::Binary | ColumnType::Varbinary | ColumnType::Blob
        )
    }

    /// Literals of string and temporal columns are written in single quotes
    pub fn needs_quoting(&self) -> bool {
        self.is_string_type() || self.is_any_date_type()
    }

    /// Classify a type name as reported by MySQL/MariaDB or PostgreSQL
    /// metadata, e.g. `VARCHAR(255)`, `int8` or `timestamp with time zone`.
    ///
    /// Names that match nothing known map to [`ColumnType::Other`].
    pub fn from_sql_name(type_name: &str) -> Self {
        let normalized = type_name.trim().to_uppercase();
        // Strip length/precision and MySQL display modifiers
        let base = normalized
            .split('(')
            .next()
            .unwrap_or_default()
            .trim_end_matches(" UNSIGNED")
            .trim();

        match base {
            "BIT" => ColumnType::Bit,
            "BOOL" | "BOOLEAN" => ColumnType::Boolean,
            "TINYINT" => ColumnType::TinyInt,
            "SMALLINT" | "INT2" | "SMALLSERIAL" => ColumnType::SmallInt,
            "INT" | "INTEGER" | "INT4" | "MEDIUMINT" | "SERIAL" => ColumnType::Integer,
            "BIGINT" | "INT8" | "BIGSERIAL" => ColumnType::BigInt,
            "REAL" | "FLOAT4" => ColumnType::Real,
            "FLOAT" => ColumnType::Float,
            "DOUBLE" | "DOUBLE PRECISION" | "FLOAT8" => ColumnType::Double,
            "NUMERIC" => ColumnType::Numeric,
            "DECIMAL" | "DEC" => ColumnType::Decimal,
            "CHAR" | "CHARACTER" | "BPCHAR" => ColumnType::Char,
            "VARCHAR" | "CHARACTER VARYING" | "NAME" | "ENUM" => ColumnType::Varchar,
            "LONGVARCHAR" => ColumnType::LongVarchar,
            "TEXT" | "TINYTEXT" | "MEDIUMTEXT" | "LONGTEXT" | "CITEXT" => ColumnType::Text,
            "NCHAR" => ColumnType::NChar,
            "NVARCHAR" => ColumnType::NVarchar,
            "CLOB" => ColumnType::Clob,
            "DATE" => ColumnType::Date,
            "TIME" | "TIME WITHOUT TIME ZONE" => ColumnType::Time,
            "TIMETZ" | "TIME WITH TIME ZONE" => ColumnType::TimeWithTimezone,
            "TIMESTAMP" | "DATETIME" | "TIMESTAMP WITHOUT TIME ZONE" => ColumnType::Timestamp,
            "TIMESTAMPTZ" | "TIMESTAMP WITH TIME ZONE" => ColumnType::TimestampWithTimezone,
            "BINARY" => ColumnType::Binary,
            "VARBINARY" | "BYTEA" => ColumnType::Varbinary,
            "BLOB" | "TINYBLOB" | "MEDIUMBLOB" | "LONGBLOB" => ColumnType::Blob,
            "JSON" => ColumnType::Json,
            "JSONB" => ColumnType::Jsonb,
            "UUID" => ColumnType::Uuid,
            _ => ColumnType::Other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quoting_classes() {
        assert!(ColumnType::Varchar.needs_quoting());
        assert!(ColumnType::Date.needs_quoting());
        assert!(ColumnType::TimestampWithTimezone.needs_quoting());
        assert!(!ColumnType::Decimal.needs_quoting());
        assert!(!ColumnType::Boolean.needs_quoting());
        assert!(!ColumnType::Json.needs_quoting());
    }

    #[test]
    fn test_from_sql_name_mysql() {
        assert_eq!(ColumnType::from_sql_name("VARCHAR(255)"), ColumnType::Varchar);
        assert_eq!(ColumnType::from_sql_name("bigint(20) unsigned"), ColumnType::BigInt);
        assert_eq!(ColumnType::from_sql_name("DATETIME"), ColumnType::Timestamp);
        assert_eq!(ColumnType::from_sql_name("decimal(19,6)"), ColumnType::Decimal);
        assert_eq!(ColumnType::from_sql_name("longtext"), ColumnType::Text);
    }

    #[test]
    fn test_from_sql_name_postgres() {
        assert_eq!(ColumnType::from_sql_name("int8"), ColumnType::BigInt);
        assert_eq!(
            ColumnType::from_sql_name("timestamp with time zone"),
            ColumnType::TimestampWithTimezone
        );
        assert_eq!(
            ColumnType::from_sql_name("character varying(100)"),
            ColumnType::Varchar
        );
        assert_eq!(ColumnType::from_sql_name("bytea"), ColumnType::Varbinary);
        assert_eq!(ColumnType::from_sql_name("tsvector"), ColumnType::Other);
    }
}
