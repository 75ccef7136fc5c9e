use crate::database::{
    DatabaseBackend, SqlGenerator, TenantDialectResolver, DEFAULT_DATE_FORMAT,
    DEFAULT_DATE_TIME_FORMAT,
};
use crate::error::{Error, Result};
use crate::tenant::{parse_timezone, SystemClock, TenantContext};
use chrono::format::{Item, StrftimeItems};
use chrono::FixedOffset;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::Path;
use std::sync::Arc;

/// Base name of the configuration file, without extension
pub const CONFIG_FILE_STEM: &str = "sqldialect";

/// Environment type for configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    /// Get environment from string
    pub fn from_name(env: &str) -> Self {
        match env.to_lowercase().as_str() {
            "production" | "prod" => Environment::Production,
            _ => Environment::Development,
        }
    }

    /// Get environment name as used in override file names
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "dev",
            Environment::Production => "prod",
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SqlDialectConfig {
    #[serde(default)]
    pub environment: Environment,

    #[serde(default)]
    pub database: DatabaseConfig,

    /// Tenants keyed by identifier
    #[serde(default)]
    pub tenants: HashMap<String, TenantConfig>,

    #[serde(default)]
    pub formats: FormatConfig,
}

/// Default backend, used when no tenant is bound
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Explicit backend; takes precedence over `url`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backend: Option<DatabaseBackend>,

    /// Connection URL, only its scheme is used
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Timezone for threads without a bound tenant
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TenantConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backend: Option<DatabaseBackend>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Falls back to the database timezone when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
}

/// chrono patterns for literals embedded into SQL
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormatConfig {
    #[serde(default = "default_date_format")]
    pub date: String,

    #[serde(default = "default_date_time_format")]
    pub date_time: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            backend: None,
            url: None,
            timezone: default_timezone(),
        }
    }
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self {
            date: default_date_format(),
            date_time: default_date_time_format(),
        }
    }
}

fn default_timezone() -> String {
    "UTC".to_string()
}
fn default_date_format() -> String {
    DEFAULT_DATE_FORMAT.to_string()
}
fn default_date_time_format() -> String {
    DEFAULT_DATE_TIME_FORMAT.to_string()
}

impl TenantConfig {
    fn backend(&self) -> Result<Option<DatabaseBackend>> {
        match (&self.backend, &self.url) {
            (Some(backend), _) => Ok(Some(*backend)),
            (None, Some(url)) => DatabaseBackend::from_url(url).map(Some),
            (None, None) => Ok(None),
        }
    }
}

fn read_config_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| {
        Error::from(e).with_context(format!("Failed to read config file '{}'", path.display()))
    })
}

impl SqlDialectConfig {
    /// Load configuration from the working directory
    pub fn load() -> Result<Self> {
        Self::load_with_base_dir(".")
    }

    /// Load `sqldialect.toml` from `base_dir`, merge the environment-specific
    /// `sqldialect.{dev|prod}.toml` over it, then apply environment variables
    pub fn load_with_base_dir<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref();
        let env = Self::detect_environment();

        let base_config_path = base_dir.join(format!("{}.toml", CONFIG_FILE_STEM));
        let mut merged_value = if base_config_path.exists() {
            Self::load_toml_value(&base_config_path)?
        } else {
            toml::Value::Table(toml::map::Map::new())
        };

        let env_config_path = base_dir.join(format!("{}.{}.toml", CONFIG_FILE_STEM, env.as_str()));
        if env_config_path.exists() {
            log::debug!(
                "Loading environment-specific config from: {}",
                env_config_path.display()
            );
            let env_value = Self::load_toml_value(&env_config_path)?;

            // Environment config takes precedence
            merged_value = serde_toml_merge::merge(merged_value, env_value).map_err(|e| {
                Error::configuration(format!("Failed to merge configuration files: {}", e))
            })?;
        }

        // Deserialize via serde_json so the merged value goes through one path
        let json_value = serde_json::to_value(&merged_value)?;
        let mut config: SqlDialectConfig = serde_json::from_value(json_value).map_err(|e| {
            Error::configuration(format!("Failed to deserialize merged configuration: {}", e))
        })?;

        config.environment = env;
        config.apply_env_overrides()?;
        config.validate()?;

        log::info!(
            "Configuration loaded and merged successfully (environment: {})",
            config.environment.as_str()
        );

        Ok(config)
    }

    /// Load configuration from a single TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_ref = path.as_ref();

        let content = read_config_file(path_ref)?;

        let config = Self::from_toml_str(&content).map_err(|e| {
            e.with_context(format!("Invalid config file '{}'", path_ref.display()))
        })?;

        log::debug!(
            "Successfully loaded configuration from: {}",
            path_ref.display()
        );
        Ok(config)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: SqlDialectConfig = toml::from_str(content).map_err(|e| {
            Error::configuration(format!("Failed to parse configuration: {}", e))
        })?;
        config.validate()?;
        Ok(config)
    }

    fn load_toml_value<P: AsRef<Path>>(path: P) -> Result<toml::Value> {
        let path_ref = path.as_ref();

        let content = read_config_file(path_ref)?;

        toml::from_str(&content).map_err(|e| {
            Error::configuration(format!(
                "Failed to parse config file '{}': {}. Check TOML syntax.",
                path_ref.display(),
                e
            ))
        })
    }

    /// Default configuration with environment variable overrides applied
    pub fn from_env() -> Result<Self> {
        let mut config = SqlDialectConfig {
            environment: Self::detect_environment(),
            ..Default::default()
        };
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Detect current environment from `SQLDIALECT_ENV`
    pub fn detect_environment() -> Environment {
        env::var("SQLDIALECT_ENV")
            .map(|e| Environment::from_name(&e))
            .unwrap_or_default()
    }

    /// Apply `SQLDIALECT_*` environment variables
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides_from(|key| env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup
    ///
    /// Recognised keys: `SQLDIALECT_BACKEND`, `SQLDIALECT_DATABASE_URL`,
    /// `SQLDIALECT_TIMEZONE`.
    pub fn apply_overrides_from<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(backend) = lookup("SQLDIALECT_BACKEND") {
            self.database.backend = Some(backend.parse()?);
        }
        if let Some(url) = lookup("SQLDIALECT_DATABASE_URL") {
            self.database.url = Some(url);
        }
        if let Some(timezone) = lookup("SQLDIALECT_TIMEZONE") {
            self.database.timezone = timezone;
        }
        Ok(())
    }

    /// Backend used when no tenant is bound
    pub fn default_backend(&self) -> Result<DatabaseBackend> {
        match (&self.database.backend, &self.database.url) {
            (Some(backend), _) => Ok(*backend),
            (None, Some(url)) => DatabaseBackend::from_url(url),
            (None, None) => Err(Error::configuration(
                "No database backend configured: set database.backend or database.url",
            )),
        }
    }

    pub fn default_timezone(&self) -> Result<FixedOffset> {
        parse_timezone(&self.database.timezone)
    }

    /// Backend configured for a tenant
    pub fn tenant_backend(&self, identifier: &str) -> Result<DatabaseBackend> {
        let tenant = self
            .tenants
            .get(identifier)
            .ok_or_else(|| Error::unknown_tenant(identifier.to_string()))?;
        tenant.backend()?.ok_or_else(|| {
            Error::configuration(format!(
                "Tenant '{}' has neither backend nor url",
                identifier
            ))
        })
    }

    /// Context to bind for requests served on behalf of `identifier`
    pub fn tenant_context(&self, identifier: &str) -> Result<TenantContext> {
        let tenant = self
            .tenants
            .get(identifier)
            .ok_or_else(|| Error::unknown_tenant(identifier.to_string()))?;
        let timezone = match &tenant.timezone {
            Some(tz) => parse_timezone(tz)?,
            None => self.default_timezone()?,
        };
        Ok(TenantContext::new(identifier)
            .with_backend(self.tenant_backend(identifier)?)
            .with_timezone(timezone))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        self.default_backend()?;
        self.default_timezone()?;

        for (identifier, tenant) in &self.tenants {
            self.tenant_backend(identifier)?;
            if let Some(tz) = &tenant.timezone {
                parse_timezone(tz).map_err(|e| {
                    e.with_context(format!("Invalid timezone for tenant '{}'", identifier))
                })?;
            }
        }

        validate_format("formats.date", &self.formats.date)?;
        validate_format("formats.date_time", &self.formats.date_time)?;

        Ok(())
    }

    /// Resolver with every configured tenant registered
    pub fn build_resolver(&self) -> Result<TenantDialectResolver> {
        let resolver = TenantDialectResolver::new(self.default_backend()?);
        for identifier in self.tenants.keys() {
            resolver.register(identifier.clone(), self.tenant_backend(identifier)?);
        }
        Ok(resolver)
    }

    pub fn build_clock(&self) -> Result<SystemClock> {
        Ok(SystemClock::with_default_timezone(self.default_timezone()?))
    }

    /// Generator wired to the configured resolver, clock and formats
    pub fn build_generator(&self) -> Result<SqlGenerator> {
        Ok(SqlGenerator::new(
            Arc::new(self.build_resolver()?),
            Arc::new(self.build_clock()?),
        )
        .with_formats(self.formats.date.clone(), self.formats.date_time.clone()))
    }
}

fn validate_format(key: &str, pattern: &str) -> Result<()> {
    if pattern.is_empty() {
        return Err(Error::configuration(format!("{} cannot be empty", key)));
    }
    if StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error)) {
        return Err(Error::configuration(format!(
            "{} is not a valid chrono pattern: '{}'",
            key, pattern
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_has_no_backend() {
        let config = SqlDialectConfig::default();
        assert_eq!(config.formats.date, "%Y-%m-%d");
        assert_eq!(config.database.timezone, "UTC");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parse_tenants() {
        let config = SqlDialectConfig::from_toml_str(
            r#"
            [database]
            url = "postgresql://localhost:5432/fineract_tenants"

            [tenants.default]
            backend = "mariadb"
            timezone = "+05:30"

            [tenants.acme]
            url = "postgres://db/acme"
            "#,
        )
        .unwrap();

        assert_eq!(config.default_backend().unwrap(), DatabaseBackend::Postgres);
        assert_eq!(
            config.tenant_backend("default").unwrap(),
            DatabaseBackend::MariaDB
        );
        assert_eq!(config.tenant_backend("acme").unwrap(), DatabaseBackend::Postgres);
        assert!(config.tenant_backend("nobody").is_err());

        let ctx = config.tenant_context("default").unwrap();
        assert_eq!(ctx.timezone.local_minus_utc(), 19800);
        assert_eq!(ctx.backend, Some(DatabaseBackend::MariaDB));
        assert_eq!(
            config.tenant_context("acme").unwrap().timezone.local_minus_utc(),
            0
        );
    }

    #[test]
    fn test_tenant_without_backend_rejected() {
        let err = SqlDialectConfig::from_toml_str(
            r#"
            [database]
            backend = "mysql"

            [tenants.broken]
            timezone = "UTC"
            "#,
        )
        .unwrap_err();
        assert_eq!(err.error_code(), "E_CONFIGURATION");
    }

    #[test]
    fn test_bad_format_rejected() {
        let err = SqlDialectConfig::from_toml_str(
            r#"
            [database]
            backend = "mysql"

            [formats]
            date = "%Y-%m-%Q"
            "#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("formats.date"));
    }

    #[test]
    fn test_overrides_from_lookup() {
        let mut config = SqlDialectConfig::default();
        config
            .apply_overrides_from(|key| match key {
                "SQLDIALECT_BACKEND" => Some("postgresql".to_string()),
                "SQLDIALECT_TIMEZONE" => Some("-03:00".to_string()),
                _ => None,
            })
            .unwrap();
        assert_eq!(config.default_backend().unwrap(), DatabaseBackend::Postgres);
        assert_eq!(config.default_timezone().unwrap().local_minus_utc(), -10800);

        let bad = config.apply_overrides_from(|key| {
            (key == "SQLDIALECT_BACKEND").then(|| "db2".to_string())
        });
        assert!(bad.is_err());
    }

    #[test]
    fn test_environment_names() {
        assert_eq!(Environment::from_name("PROD"), Environment::Production);
        assert_eq!(Environment::from_name("staging"), Environment::Development);
        assert_eq!(Environment::Production.as_str(), "prod");
    }
}
